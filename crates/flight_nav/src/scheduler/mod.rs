//! Bounded-concurrency dispatch of path queries.
//!
//! # Flow
//!
//! ```text
//! Caller (tick)                       Search pool (rayon)
//! ┌──────────────┐
//! │ submit()     │──► queued (FIFO)
//! └──────────────┘
//! ┌──────────────┐
//! │ step()       │
//! │ - reap done  │◄──── completion channel ◄──┐
//! │ - dispatch   │──► spawn ──► find_path() ──┤
//! └──────────────┘               complete()   │
//! ┌──────────────┐                            │
//! │ poll()       │ (atomic status read)       │
//! │ result()     │                            │
//! └──────────────┘
//! ```
//!
//! Each [`PathRequest`] has one writer: the worker that runs it. The caller
//! only reads its status flag, and the outcome becomes visible once the flag
//! reads [`RequestStatus::Done`]. The octree is shared read-only, so searches
//! run without locks.
//!
//! A search that panics still completes its request, with
//! [`PathError::SearchPanicked`] as the outcome.
//!
//! Requests cannot be cancelled. A caller that wants a fresher path submits
//! a new request and keeps using the old result until the new one is done;
//! [`PathSlot`] packages that pattern.

mod slot;

use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam_channel::{self as channel, Receiver, Sender};
use glam::Vec3;
use tracing::{debug, trace, warn};

use crate::config::SchedulerConfig;
use crate::error::{NavError, PathError};
use crate::octree::Octree;
use crate::search::{self, AgentParams, BaseCost, CostWeighting, PathOutcome};

pub use slot::PathSlot;

/// Identifies one submitted request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathHandle(u64);

impl PathHandle {
  #[inline]
  pub fn raw(self) -> u64 {
    self.0
  }
}

/// Lifecycle of a request. Only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestStatus {
  Queued = 0,
  Running = 1,
  Done = 2,
}

impl RequestStatus {
  fn from_u8(value: u8) -> Self {
    match value {
      0 => RequestStatus::Queued,
      1 => RequestStatus::Running,
      _ => RequestStatus::Done,
    }
  }
}

/// Outcome stored on a finished request.
pub type RequestOutcome = Result<PathOutcome, PathError>;

/// A path query and, once done, its outcome.
#[derive(Debug)]
pub struct PathRequest {
  pub from: Vec3,
  pub to: Vec3,
  pub agent: AgentParams,
  status: AtomicU8,
  outcome: OnceLock<RequestOutcome>,
}

impl PathRequest {
  fn new(from: Vec3, to: Vec3, agent: AgentParams) -> Self {
    Self {
      from,
      to,
      agent,
      status: AtomicU8::new(RequestStatus::Queued as u8),
      outcome: OnceLock::new(),
    }
  }

  #[inline]
  pub fn status(&self) -> RequestStatus {
    RequestStatus::from_u8(self.status.load(Ordering::Acquire))
  }

  #[inline]
  pub fn is_done(&self) -> bool {
    self.status() == RequestStatus::Done
  }

  /// The outcome, or `None` until the request is done.
  pub fn outcome(&self) -> Option<&RequestOutcome> {
    if self.is_done() {
      self.outcome.get()
    } else {
      None
    }
  }

  fn mark_running(&self) {
    self
      .status
      .store(RequestStatus::Running as u8, Ordering::Release);
  }

  /// Publish the outcome, then flip the flag.
  fn complete(&self, outcome: RequestOutcome) {
    let _ = self.outcome.set(outcome);
    self.status.store(RequestStatus::Done as u8, Ordering::Release);
  }
}

/// What one [`PathScheduler::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
  /// Requests moved from queued to running.
  pub started: usize,
  /// Finished requests removed from the running set.
  pub reaped: usize,
}

/// Runs path queries against one shared octree with at most
/// `max_concurrency` searches in flight.
pub struct PathScheduler {
  tree: Arc<Octree>,
  weighting: Arc<dyn CostWeighting>,
  config: SchedulerConfig,
  pool: rayon::ThreadPool,
  requests: HashMap<PathHandle, Arc<PathRequest>>,
  queued: VecDeque<PathHandle>,
  running: HashSet<PathHandle>,
  completed_tx: Sender<PathHandle>,
  completed_rx: Receiver<PathHandle>,
  next_id: u64,
}

impl PathScheduler {
  /// Scheduler using [`BaseCost`] weighting.
  pub fn new(tree: Arc<Octree>, config: SchedulerConfig) -> Result<Self, NavError> {
    Self::with_weighting(tree, Arc::new(BaseCost), config)
  }

  pub fn with_weighting(
    tree: Arc<Octree>,
    weighting: Arc<dyn CostWeighting>,
    config: SchedulerConfig,
  ) -> Result<Self, NavError> {
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(config.max_concurrency)
      .thread_name(|index| format!("flight-nav-search-{}", index))
      .build()?;
    let (completed_tx, completed_rx) = channel::unbounded();

    debug!(
      max_concurrency = config.max_concurrency,
      slice_us = config.time_budget.slice.as_micros() as u64,
      "path scheduler started"
    );

    Ok(Self {
      tree,
      weighting,
      config,
      pool,
      requests: HashMap::new(),
      queued: VecDeque::new(),
      running: HashSet::new(),
      completed_tx,
      completed_rx,
      next_id: 0,
    })
  }

  /// Queue a path query. Nothing runs until the next [`step`](Self::step).
  pub fn submit(&mut self, from: Vec3, to: Vec3, agent: AgentParams) -> PathHandle {
    let handle = PathHandle(self.next_id);
    self.next_id += 1;

    self
      .requests
      .insert(handle, Arc::new(PathRequest::new(from, to, agent)));
    self.queued.push_back(handle);
    trace!(handle = handle.raw(), "path request queued");

    handle
  }

  /// Reap finished searches, then start queued ones up to the concurrency
  /// limit in arrival order. Call once per tick.
  pub fn step(&mut self) -> StepReport {
    let mut report = StepReport::default();

    for handle in self.completed_rx.try_iter() {
      if self.running.remove(&handle) {
        report.reaped += 1;
        trace!(handle = handle.raw(), "path request reaped");
      }
    }

    while self.running.len() < self.config.max_concurrency {
      let Some(handle) = self.queued.pop_front() else {
        break;
      };
      let Some(request) = self.requests.get(&handle).cloned() else {
        continue;
      };

      request.mark_running();
      self.running.insert(handle);
      report.started += 1;
      trace!(handle = handle.raw(), "path request dispatched");

      let tree = Arc::clone(&self.tree);
      let weighting = Arc::clone(&self.weighting);
      let budget = self.config.time_budget;
      let completed_tx = self.completed_tx.clone();

      self.pool.spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
          search::find_path(
            &tree,
            request.from,
            request.to,
            &request.agent,
            weighting.as_ref(),
            &budget,
          )
        }))
        .unwrap_or_else(|_| {
          warn!(handle = handle.raw(), "path search panicked");
          Err(PathError::SearchPanicked)
        });
        request.complete(outcome);
        // Receiver lives in the scheduler; a closed channel only means it was dropped.
        let _ = completed_tx.send(handle);
      });
    }

    report
  }

  /// Current status of a request.
  pub fn poll(&self, handle: PathHandle) -> Result<RequestStatus, NavError> {
    Ok(self.request(handle)?.status())
  }

  /// Waypoints of a finished request.
  ///
  /// `None` while the request is pending, and also when it finished without
  /// a path (an endpoint outside the tree, or a panicked search). Partial paths are returned; use
  /// [`request`](Self::request) to inspect the full outcome.
  pub fn result(&self, handle: PathHandle) -> Result<Option<Vec<Vec3>>, NavError> {
    let request = self.request(handle)?;
    Ok(match request.outcome() {
      Some(Ok(outcome)) => Some(outcome.path.clone()),
      _ => None,
    })
  }

  /// Shared access to a request.
  pub fn request(&self, handle: PathHandle) -> Result<Arc<PathRequest>, NavError> {
    self
      .requests
      .get(&handle)
      .cloned()
      .ok_or(NavError::UnknownHandle(handle))
  }

  /// Forget a finished request, returning its outcome.
  ///
  /// Returns `Ok(None)` and keeps the request if it has not finished yet.
  pub fn release(&mut self, handle: PathHandle) -> Result<Option<RequestOutcome>, NavError> {
    let request = self.request(handle)?;
    let Some(outcome) = request.outcome() else {
      return Ok(None);
    };

    let outcome = outcome.clone();
    self.requests.remove(&handle);
    self.running.remove(&handle);
    trace!(handle = handle.raw(), "path request released");

    Ok(Some(outcome))
  }

  pub fn queued_count(&self) -> usize {
    self.queued.len()
  }

  /// Requests dispatched and not yet reaped.
  pub fn running_count(&self) -> usize {
    self.running.len()
  }

  /// Nothing queued and nothing left to reap.
  pub fn is_idle(&self) -> bool {
    self.queued.is_empty() && self.running.is_empty()
  }

  pub fn tree(&self) -> &Arc<Octree> {
    &self.tree
  }

  pub fn config(&self) -> &SchedulerConfig {
    &self.config
  }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
