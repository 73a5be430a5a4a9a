//! Time-sliced best-first search over octree leaves.
//!
//! The graph is the leaf adjacency built by [`Octree::build`]. A search:
//!
//! - locates the leaves containing `from` and `to`,
//! - expands cells in order of `weight + squared distance to goal`, moving
//!   only through free leaves (the goal leaf is always enterable),
//! - tracks the closest cell seen so that an unreachable goal still yields a
//!   partial path making progress toward it,
//! - pauses cooperatively whenever its [`TimeBudget`] slice is used up.
//!
//! The distance term is squared. It is not an admissible heuristic, so paths
//! are not guaranteed shortest, only terminating and making progress.
//!
//! # Path shape
//!
//! A path lists the centers of the cells it passes through, starting with the
//! start cell's center. When the goal is reached the goal cell's center is
//! replaced with the exact `to` point. Partial paths end at the closest cell's
//! center.

mod frontier;
mod pacer;

use glam::Vec3;
use tracing::debug;
use web_time::Instant;

use crate::config::TimeBudget;
use crate::error::PathError;
use crate::octree::{CellId, Octree, SpatialCell};
use frontier::Frontier;
use pacer::Pacer;

/// Flight envelope of the agent requesting a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentParams {
  pub preferred_height: f32,
  pub min_height: f32,
  pub max_height: f32,
}

impl AgentParams {
  pub const DEFAULT: Self = Self {
    preferred_height: 0.0,
    min_height: f32::MIN,
    max_height: f32::MAX,
  };
}

impl Default for AgentParams {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Per-cell traversal weight.
///
/// Called for the start cell and for every neighbor considered. Must return a
/// positive finite value.
pub trait CostWeighting: Send + Sync {
  fn weight(&self, cell: &SpatialCell, agent: &AgentParams) -> f32;
}

/// The cell's base cost, ignoring the agent.
///
/// Height preference is not applied; biasing by altitude floods the frontier.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaseCost;

impl CostWeighting for BaseCost {
  #[inline]
  fn weight(&self, cell: &SpatialCell, _agent: &AgentParams) -> f32 {
    cell.cost
  }
}

/// Counters for one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
  /// Cells popped and expanded.
  pub expanded: usize,
  /// Largest frontier size.
  pub frontier_peak: usize,
  /// Cooperative pauses taken.
  pub yields: u32,
  pub elapsed_us: u64,
}

/// Result of a search that found its endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct PathOutcome {
  pub path: Vec<Vec3>,
  /// True if the goal was not reached and `path` ends at the closest cell.
  pub partial: bool,
  pub stats: SearchStats,
}

/// Search for a path from `from` to `to`.
///
/// Fails only when an endpoint lies outside the tree. An unreachable goal is
/// not an error: the outcome is a partial path toward it.
#[tracing::instrument(skip_all, name = "search::find_path")]
pub fn find_path<W>(
  tree: &Octree,
  from: Vec3,
  to: Vec3,
  agent: &AgentParams,
  weighting: &W,
  budget: &TimeBudget,
) -> Result<PathOutcome, PathError>
where
  W: CostWeighting + ?Sized,
{
  let started = Instant::now();
  let start = tree.locate(from).ok_or(PathError::StartOutOfBounds(from))?;
  let goal = tree.locate(to).ok_or(PathError::GoalOutOfBounds(to))?;

  let mut best = vec![f32::INFINITY; tree.len()];
  let mut came_from: Vec<Option<CellId>> = vec![None; tree.len()];
  let mut frontier = Frontier::new();
  let mut pacer = Pacer::new(*budget);
  let mut stats = SearchStats::default();

  let start_weight = weighting.weight(tree.cell(start), agent);
  let start_distance = tree.cell(start).region.center.distance_squared(to);
  best[start.index()] = start_weight;
  frontier.push(start, start_weight + start_distance, start_weight);

  let mut closest = start;
  let mut closest_distance = start_distance;
  let mut reached = false;

  while let Some(entry) = frontier.pop() {
    pacer.checkpoint();

    if entry.weight > best[entry.cell.index()] {
      continue;
    }
    if entry.cell == goal {
      reached = true;
      break;
    }
    stats.expanded += 1;

    for next in tree.cell(entry.cell).all_neighbors() {
      let cell = tree.cell(next);
      if cell.occupied && next != goal {
        continue;
      }

      let distance = cell.region.center.distance_squared(to);
      if distance < closest_distance {
        closest = next;
        closest_distance = distance;
      }

      let weight = entry.weight + weighting.weight(cell, agent);
      if weight < best[next.index()] {
        best[next.index()] = weight;
        came_from[next.index()] = Some(entry.cell);
        frontier.push(next, weight + distance, weight);
      }
    }
  }

  let tail = if reached { goal } else { closest };
  let (mut path, broken) = reconstruct(tree, start, tail, &came_from);
  let partial = !reached || broken;
  if !partial {
    if path.len() > 1 {
      path.pop();
    }
    path.push(to);
  }

  stats.frontier_peak = frontier.peak();
  stats.yields = pacer.yields();
  stats.elapsed_us = started.elapsed().as_micros() as u64;

  debug!(
    start = start.raw(),
    goal = goal.raw(),
    reached,
    waypoints = path.len(),
    expanded = stats.expanded,
    frontier_peak = stats.frontier_peak,
    yields = stats.yields,
    elapsed_us = stats.elapsed_us,
    "search finished"
  );

  Ok(PathOutcome {
    path,
    partial,
    stats,
  })
}

/// Cell centers from `start` to `tail` following `came_from`.
///
/// The flag is set if the chain breaks before reaching `start`; the path then
/// begins at the last cell the chain could reach.
fn reconstruct(
  tree: &Octree,
  start: CellId,
  tail: CellId,
  came_from: &[Option<CellId>],
) -> (Vec<Vec3>, bool) {
  let mut chain = vec![tail];
  let mut current = tail;
  let mut broken = false;

  while current != start {
    // A chain longer than the tree can only come from a weighting that broke
    // the positive-weight contract.
    if chain.len() > tree.len() {
      broken = true;
      break;
    }
    match came_from[current.index()] {
      Some(previous) => {
        chain.push(previous);
        current = previous;
      }
      None => {
        broken = true;
        break;
      }
    }
  }

  let path = chain
    .iter()
    .rev()
    .map(|id| tree.cell(*id).region.center)
    .collect();
  (path, broken)
}
