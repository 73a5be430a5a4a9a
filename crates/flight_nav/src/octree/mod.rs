//! Octree module for free-volume partitioning.
//!
//! The tree is built once from a covering region and an occupancy oracle,
//! then linked so that every leaf knows the leaves touching each of its 6
//! faces. After that the structure is immutable and can be shared across
//! search threads without locking.
//!
//! # Storage
//!
//! All cells live in one arena (`Vec<SpatialCell>`). Parent, child and
//! neighbor relations are [`CellId`] indices, so there are no ownership
//! cycles between parents, children and cross-linked neighbors.
//!
//! # Module Structure
//!
//! - [`bounds`]: `Region` - center/half-extent boxes and octant math
//! - [`tables`]: `Face` and the fixed octant lookup tables
//! - [`cell`]: `SpatialCell` and `CellId`
//! - [`tree`]: `Octree` - breadth-first build, point location, inspection
//! - [`neighbors`]: face-neighbor resolution across depths

pub mod bounds;
pub mod cell;
pub mod neighbors;
pub mod tables;
pub mod tree;

// Re-exports
pub use bounds::Region;
pub use cell::{CellId, SpatialCell, DEFAULT_CELL_COST};
pub use tables::Face;
pub use tree::{BuildStats, LeafView, Octree};
