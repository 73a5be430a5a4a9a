use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use super::*;
use crate::config::TimeBudget;
use crate::octree::SpatialCell;
use crate::test_utils::*;

fn config(max_concurrency: usize) -> SchedulerConfig {
  SchedulerConfig {
    max_concurrency,
    time_budget: TimeBudget::UNLIMITED,
  }
}

fn scheduler(max_concurrency: usize) -> PathScheduler {
  PathScheduler::new(Arc::new(solid_octant_tree()), config(max_concurrency)).unwrap()
}

/// Step until idle, checking the concurrency bound after every step.
fn run_until_idle(scheduler: &mut PathScheduler) -> StepReport {
  let mut total = StepReport::default();
  for _ in 0..5_000 {
    let report = scheduler.step();
    total.started += report.started;
    total.reaped += report.reaped;
    assert!(scheduler.running_count() <= scheduler.config().max_concurrency);
    if scheduler.is_idle() {
      return total;
    }
    thread::sleep(Duration::from_millis(1));
  }
  panic!("scheduler did not become idle");
}

/// Blocks every weight query until opened, holding searches in `Running`.
struct Gate(Arc<AtomicBool>);

impl CostWeighting for Gate {
  fn weight(&self, cell: &SpatialCell, _agent: &AgentParams) -> f32 {
    while !self.0.load(Ordering::Acquire) {
      thread::yield_now();
    }
    cell.cost
  }
}

fn gated_scheduler(max_concurrency: usize) -> (PathScheduler, Arc<AtomicBool>) {
  let open = Arc::new(AtomicBool::new(false));
  let scheduler = PathScheduler::with_weighting(
    Arc::new(solid_octant_tree()),
    Arc::new(Gate(Arc::clone(&open))),
    config(max_concurrency),
  )
  .unwrap();
  (scheduler, open)
}

const FROM: Vec3 = Vec3::new(-4.0, -4.0, -4.0);
const TO: Vec3 = Vec3::new(4.0, -4.0, 4.0);

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_zero_concurrency_rejected() {
  let result = PathScheduler::new(Arc::new(solid_octant_tree()), config(0));
  assert!(matches!(result, Err(NavError::InvalidConfig(_))));
}

// =========================================================================
// Lifecycle
// =========================================================================

/// Nothing runs before the first step.
#[test]
fn test_submit_only_queues() {
  let mut scheduler = scheduler(2);
  let handle = scheduler.submit(FROM, TO, AgentParams::DEFAULT);

  assert_eq!(scheduler.poll(handle).unwrap(), RequestStatus::Queued);
  assert_eq!(scheduler.result(handle).unwrap(), None);
  assert_eq!(scheduler.queued_count(), 1);
  assert_eq!(scheduler.running_count(), 0);
  assert!(!scheduler.is_idle());
}

/// Results match a direct search on the same tree.
#[test]
fn test_requests_complete() {
  let mut scheduler = scheduler(3);
  let handles: Vec<PathHandle> = (0..8)
    .map(|_| scheduler.submit(FROM, TO, AgentParams::DEFAULT))
    .collect();

  let total = run_until_idle(&mut scheduler);
  assert_eq!(total.started, 8);
  assert_eq!(total.reaped, 8);

  let expected = search::find_path(
    scheduler.tree(),
    FROM,
    TO,
    &AgentParams::DEFAULT,
    &BaseCost,
    &TimeBudget::UNLIMITED,
  )
  .unwrap();

  for handle in handles {
    assert_eq!(scheduler.poll(handle).unwrap(), RequestStatus::Done);
    assert_eq!(scheduler.result(handle).unwrap(), Some(expected.path.clone()));
  }
}

/// At most `max_concurrency` start per step, in submission order.
#[test]
fn test_dispatch_respects_limit_and_order() {
  let (mut scheduler, open) = gated_scheduler(2);
  let handles: Vec<PathHandle> = (0..5)
    .map(|_| scheduler.submit(FROM, TO, AgentParams::DEFAULT))
    .collect();

  let report = scheduler.step();
  assert_eq!(report.started, 2);
  assert_eq!(scheduler.running_count(), 2);
  assert_eq!(scheduler.queued_count(), 3);
  assert_eq!(scheduler.poll(handles[0]).unwrap(), RequestStatus::Running);
  assert_eq!(scheduler.poll(handles[1]).unwrap(), RequestStatus::Running);
  for handle in &handles[2..] {
    assert_eq!(scheduler.poll(*handle).unwrap(), RequestStatus::Queued);
  }

  // Full: further steps start nothing while both are held.
  assert_eq!(scheduler.step().started, 0);

  open.store(true, Ordering::Release);
  run_until_idle(&mut scheduler);
  for handle in handles {
    assert_eq!(scheduler.poll(handle).unwrap(), RequestStatus::Done);
  }
}

/// Out-of-bounds endpoints finish without a path instead of failing.
#[test]
fn test_out_of_bounds_request_finishes_without_path() {
  let mut scheduler = scheduler(1);
  let outside = Vec3::splat(50.0);
  let handle = scheduler.submit(outside, TO, AgentParams::DEFAULT);
  run_until_idle(&mut scheduler);

  assert_eq!(scheduler.poll(handle).unwrap(), RequestStatus::Done);
  assert_eq!(scheduler.result(handle).unwrap(), None);
  let request = scheduler.request(handle).unwrap();
  assert_eq!(
    request.outcome(),
    Some(&Err(PathError::StartOutOfBounds(outside)))
  );
}

/// Weighting that panics on every call.
struct Explode;

impl CostWeighting for Explode {
  fn weight(&self, _cell: &SpatialCell, _agent: &AgentParams) -> f32 {
    panic!("weighting blew up");
  }
}

/// A panicking search still finishes its request and frees its slot.
#[test]
fn test_panicking_search_completes_with_error() {
  let mut scheduler =
    PathScheduler::with_weighting(Arc::new(solid_octant_tree()), Arc::new(Explode), config(1))
      .unwrap();
  let first = scheduler.submit(FROM, TO, AgentParams::DEFAULT);
  let second = scheduler.submit(FROM, TO, AgentParams::DEFAULT);

  let total = run_until_idle(&mut scheduler);
  assert_eq!(total.reaped, 2);

  for handle in [first, second] {
    assert_eq!(scheduler.poll(handle).unwrap(), RequestStatus::Done);
    assert_eq!(scheduler.result(handle).unwrap(), None);
    assert_eq!(
      scheduler.request(handle).unwrap().outcome(),
      Some(&Err(PathError::SearchPanicked))
    );
  }
}

#[test]
fn test_unknown_handle_is_error() {
  let scheduler = scheduler(1);
  let bogus = PathHandle(42);

  assert!(matches!(scheduler.poll(bogus), Err(NavError::UnknownHandle(h)) if h == bogus));
  assert!(scheduler.result(bogus).is_err());
}

// =========================================================================
// Release
// =========================================================================

#[test]
fn test_release_pending_is_refused() {
  let mut scheduler = scheduler(1);
  let handle = scheduler.submit(FROM, TO, AgentParams::DEFAULT);

  assert_eq!(scheduler.release(handle).unwrap(), None);
  assert_eq!(scheduler.poll(handle).unwrap(), RequestStatus::Queued);
}

#[test]
fn test_release_done_returns_outcome() {
  let mut scheduler = scheduler(1);
  let handle = scheduler.submit(FROM, TO, AgentParams::DEFAULT);
  run_until_idle(&mut scheduler);

  let outcome = scheduler.release(handle).unwrap().unwrap().unwrap();
  assert!(!outcome.partial);
  assert_eq!(*outcome.path.last().unwrap(), TO);
  assert!(matches!(scheduler.poll(handle), Err(NavError::UnknownHandle(_))));
}

// =========================================================================
// PathSlot
// =========================================================================

#[test]
fn test_empty_slot() {
  let scheduler = scheduler(1);
  let slot = PathSlot::new(2.0);

  assert!(slot.should_replan(&scheduler, TO));
  assert_eq!(slot.current(&scheduler), None);
  assert_eq!(slot.current_path(&scheduler), None);
}

#[test]
fn test_slot_replans_on_target_drift() {
  let mut scheduler = scheduler(1);
  let mut slot = PathSlot::new(2.0);
  let handle = slot.request(&mut scheduler, FROM, TO, AgentParams::DEFAULT);

  // In flight: never replan.
  assert!(!slot.should_replan(&scheduler, Vec3::splat(100.0)));

  run_until_idle(&mut scheduler);
  assert_eq!(slot.current(&scheduler), Some(handle));
  assert!(!slot.should_replan(&scheduler, TO + Vec3::X));
  assert!(slot.should_replan(&scheduler, TO + Vec3::X * 3.0));
}

/// The stale path is served until the new one finishes.
#[test]
fn test_slot_keeps_stale_path_while_searching() {
  let (mut scheduler, open) = gated_scheduler(2);
  open.store(true, Ordering::Release);

  let mut slot = PathSlot::new(1.0);
  let first = slot.request(&mut scheduler, FROM, TO, AgentParams::DEFAULT);
  run_until_idle(&mut scheduler);
  let first_path = slot.current_path(&scheduler).unwrap();

  open.store(false, Ordering::Release);
  let new_target = Vec3::new(-4.0, 4.0, 4.0);
  let second = slot.request(&mut scheduler, FROM, new_target, AgentParams::DEFAULT);
  scheduler.step();

  assert_eq!(scheduler.poll(second).unwrap(), RequestStatus::Running);
  assert_eq!(slot.previous(), Some(first));
  assert_eq!(slot.current(&scheduler), Some(first));
  assert_eq!(slot.current_path(&scheduler), Some(first_path));

  open.store(true, Ordering::Release);
  run_until_idle(&mut scheduler);
  assert_eq!(slot.current(&scheduler), Some(second));
  assert_eq!(
    slot.current_path(&scheduler).unwrap().last(),
    Some(&new_target)
  );

  // A third request retires the first.
  slot.request(&mut scheduler, FROM, TO, AgentParams::DEFAULT);
  assert!(matches!(scheduler.poll(first), Err(NavError::UnknownHandle(_))));
  assert_eq!(slot.previous(), Some(second));
  run_until_idle(&mut scheduler);
}

/// A failed request does not displace the last good path.
#[test]
fn test_slot_ignores_failed_request() {
  let mut scheduler = scheduler(1);
  let mut slot = PathSlot::new(1.0);
  let first = slot.request(&mut scheduler, FROM, TO, AgentParams::DEFAULT);
  run_until_idle(&mut scheduler);
  let first_path = slot.current_path(&scheduler).unwrap();

  let outside = Vec3::splat(50.0);
  let failed = slot.request(&mut scheduler, FROM, outside, AgentParams::DEFAULT);
  run_until_idle(&mut scheduler);

  assert_eq!(scheduler.poll(failed).unwrap(), RequestStatus::Done);
  assert_eq!(slot.latest(), Some(failed));
  assert_eq!(slot.previous(), Some(first));
  assert_eq!(slot.current(&scheduler), Some(first));
  assert_eq!(slot.current_path(&scheduler), Some(first_path));

  // Superseding the failed request drops it and keeps the good one.
  let next = slot.request(&mut scheduler, FROM, TO, AgentParams::DEFAULT);
  assert_eq!(slot.previous(), Some(first));
  assert_eq!(slot.latest(), Some(next));
  assert!(matches!(scheduler.poll(failed), Err(NavError::UnknownHandle(_))));

  run_until_idle(&mut scheduler);
  assert_eq!(slot.current(&scheduler), Some(next));
}

/// Superseding an unfinished request keeps the finished one as previous and
/// releases the unfinished one once it completes.
#[test]
fn test_slot_retires_unfinished_request() {
  let (mut scheduler, open) = gated_scheduler(2);
  open.store(true, Ordering::Release);

  let mut slot = PathSlot::new(1.0);
  let first = slot.request(&mut scheduler, FROM, TO, AgentParams::DEFAULT);
  run_until_idle(&mut scheduler);

  open.store(false, Ordering::Release);
  let second = slot.request(&mut scheduler, FROM, Vec3::splat(4.0), AgentParams::DEFAULT);
  scheduler.step();
  let third = slot.request(&mut scheduler, FROM, Vec3::splat(-5.0), AgentParams::DEFAULT);

  assert_eq!(slot.previous(), Some(first));
  assert_eq!(slot.latest(), Some(third));
  assert_eq!(slot.retired_count(), 1);

  open.store(true, Ordering::Release);
  run_until_idle(&mut scheduler);
  slot.collect_retired(&mut scheduler);

  assert_eq!(slot.retired_count(), 0);
  assert!(matches!(scheduler.poll(second), Err(NavError::UnknownHandle(_))));
  assert_eq!(slot.current(&scheduler), Some(third));

  slot.clear(&mut scheduler);
  assert!(scheduler.poll(first).is_err());
  assert!(scheduler.poll(third).is_err());
}
