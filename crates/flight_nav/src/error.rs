//! Error types.
//!
//! Recoverable search conditions ([`PathError`]) are stored as the outcome of
//! a finished request. [`NavError`] covers setup failures and misuse of the
//! request API.

use glam::Vec3;
use thiserror::Error;

use crate::scheduler::PathHandle;

/// A single occupancy query failed.
///
/// The build treats the queried cell as blocked and keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
  #[error("occupancy query failed: {0}")]
  Query(String),
}

/// Why a search produced no path at all.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PathError {
  #[error("start point {0} is outside the navigable volume")]
  StartOutOfBounds(Vec3),
  #[error("goal point {0} is outside the navigable volume")]
  GoalOutOfBounds(Vec3),
  /// The search panicked, most likely inside a cost weighting.
  #[error("search panicked")]
  SearchPanicked,
}

/// Setup failures and request API contract violations.
#[derive(Debug, Error)]
pub enum NavError {
  #[error("unknown path handle {0:?}")]
  UnknownHandle(PathHandle),
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
  #[error("failed to build search thread pool")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
