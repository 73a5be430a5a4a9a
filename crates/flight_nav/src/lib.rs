//! flight_nav - Engine independent 3D pathfinding for flying agents
//!
//! This crate partitions a bounded volume into an octree of free and blocked
//! cells, links every leaf to the leaves touching its faces, and answers
//! point-to-point path queries over that graph under a per-search time budget
//! and a bound on concurrent searches.
//!
//! # Features
//!
//! - **Adaptive Octree**: Blocked cells are refined down to a minimum size,
//!   free space stays coarse
//! - **Cross-Depth Neighbors**: Octant mirroring finds face neighbors between
//!   leaves of any depth
//! - **Best-First Search**: Weighted search with partial-path fallback when
//!   the goal is unreachable
//! - **Request Scheduling**: FIFO queue feeding a bounded rayon pool, polled
//!   once per tick
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use flight_nav::{AgentParams, NavConfig, ObstacleSet, Octree, PathScheduler, Region};
//! use glam::Vec3;
//!
//! let mut obstacles = ObstacleSet::new();
//! obstacles.add_box(Vec3::new(-1.0, -8.0, -8.0), Vec3::new(1.0, 4.0, 8.0));
//!
//! let config = NavConfig::default();
//! let region = Region::new(Vec3::ZERO, Vec3::splat(8.0));
//! let tree = Arc::new(Octree::build(region, &obstacles, &config.build)?);
//!
//! let mut scheduler = PathScheduler::new(tree, config.scheduler)?;
//! let handle = scheduler.submit(Vec3::splat(-6.0), Vec3::splat(6.0), AgentParams::DEFAULT);
//!
//! // Once per tick
//! scheduler.step();
//! if let Some(path) = scheduler.result(handle)? {
//!     println!("{} waypoints", path.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod octree;
pub mod oracle;
pub mod scheduler;
pub mod search;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used items
pub use config::{BuildConfig, NavConfig, SchedulerConfig, TimeBudget};
pub use error::{NavError, OracleError, PathError};
pub use octree::{BuildStats, CellId, Face, LeafView, Octree, Region, SpatialCell};
pub use oracle::{FnOracle, LayerMask, Obstacle, ObstacleSet, OccupancyOracle};
pub use scheduler::{
  PathHandle, PathRequest, PathScheduler, PathSlot, RequestOutcome, RequestStatus, StepReport,
};
pub use search::{find_path, AgentParams, BaseCost, CostWeighting, PathOutcome, SearchStats};
