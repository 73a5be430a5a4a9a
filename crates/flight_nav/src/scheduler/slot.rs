//! Per-agent request superseding.

use glam::Vec3;

use super::{PathHandle, PathScheduler, RequestStatus};
use crate::search::AgentParams;

/// Tracks the path requests of one agent.
///
/// Holds the latest request and the previous one. While the latest is still
/// being searched, [`current`](Self::current) keeps answering with the
/// previous result, so the agent always has a path to follow. Requests that
/// are superseded before they finish are released once they complete.
#[derive(Clone, Debug)]
pub struct PathSlot {
  previous: Option<PathHandle>,
  latest: Option<PathHandle>,
  retired: Vec<PathHandle>,
  destination: Option<Vec3>,
  replan_distance: f32,
}

impl PathSlot {
  /// `replan_distance`: how far the target may drift from the last requested
  /// destination before [`should_replan`](Self::should_replan) fires.
  pub fn new(replan_distance: f32) -> Self {
    Self {
      previous: None,
      latest: None,
      retired: Vec::new(),
      destination: None,
      replan_distance,
    }
  }

  /// Submit a new request toward `to`, superseding the latest one.
  pub fn request(
    &mut self,
    scheduler: &mut PathScheduler,
    from: Vec3,
    to: Vec3,
    agent: AgentParams,
  ) -> PathHandle {
    if let Some(latest) = self.latest.take() {
      if has_path(scheduler, latest) || self.previous.is_none() {
        self.retired.extend(self.previous.replace(latest));
      } else {
        // Keep the older path in use; drop the unfinished or failed one.
        self.retired.push(latest);
      }
    }

    let handle = scheduler.submit(from, to, agent);
    self.latest = Some(handle);
    self.destination = Some(to);
    self.collect_retired(scheduler);
    handle
  }

  /// True when nothing is in flight and the target has moved more than
  /// `replan_distance` from the last requested destination.
  pub fn should_replan(&self, scheduler: &PathScheduler, target: Vec3) -> bool {
    let (Some(latest), Some(destination)) = (self.latest, self.destination) else {
      return true;
    };
    match scheduler.poll(latest) {
      Ok(RequestStatus::Done) => {
        destination.distance_squared(target) > self.replan_distance * self.replan_distance
      }
      Ok(_) => false,
      Err(_) => true,
    }
  }

  /// The newest request that finished with a path: the latest once it has
  /// one, else the previous.
  pub fn current(&self, scheduler: &PathScheduler) -> Option<PathHandle> {
    [self.latest, self.previous]
      .into_iter()
      .flatten()
      .find(|handle| has_path(scheduler, *handle))
  }

  /// Waypoints of [`current`](Self::current).
  pub fn current_path(&self, scheduler: &PathScheduler) -> Option<Vec<Vec3>> {
    let handle = self.current(scheduler)?;
    scheduler.result(handle).ok().flatten()
  }

  pub fn latest(&self) -> Option<PathHandle> {
    self.latest
  }

  pub fn previous(&self) -> Option<PathHandle> {
    self.previous
  }

  /// Superseded requests still waiting to finish.
  pub fn retired_count(&self) -> usize {
    self.retired.len()
  }

  /// Release superseded requests that have finished.
  pub fn collect_retired(&mut self, scheduler: &mut PathScheduler) {
    self
      .retired
      .retain(|handle| matches!(scheduler.release(*handle), Ok(None)));
  }

  /// Release everything this slot holds that has finished.
  pub fn clear(&mut self, scheduler: &mut PathScheduler) {
    self.retired.extend(self.previous.take());
    self.retired.extend(self.latest.take());
    self.destination = None;
    self.collect_retired(scheduler);
  }
}

fn has_path(scheduler: &PathScheduler, handle: PathHandle) -> bool {
  scheduler
    .request(handle)
    .is_ok_and(|request| matches!(request.outcome(), Some(Ok(_))))
}
