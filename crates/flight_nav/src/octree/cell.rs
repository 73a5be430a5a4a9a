//! SpatialCell - one node of the octree arena, leaf or internal.
//!
//! Cells never own each other. Parent, child and neighbor links are
//! [`CellId`] indices into the arena held by [`Octree`](super::Octree).

use super::{Face, Region};

/// Base traversal cost of a cell.
pub const DEFAULT_CELL_COST: f32 = 1.0;

/// Stable index of a cell inside its octree arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CellId(u32);

impl CellId {
  /// The root cell is always allocated first.
  pub const ROOT: CellId = CellId(0);

  #[inline]
  pub(crate) fn from_index(index: usize) -> Self {
    debug_assert!(index <= u32::MAX as usize, "octree arena overflow");
    Self(index as u32)
  }

  /// Position in the arena.
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }

  /// Get the raw ID value.
  #[inline]
  pub fn raw(self) -> u32 {
    self.0
  }
}

/// One axis-aligned cell of the octree.
///
/// A cell is either a leaf (no children, neighbor lists once linked) or an
/// internal node (exactly 8 children, never neighbor lists).
#[derive(Clone, Debug)]
pub struct SpatialCell {
  /// Bounds of this cell.
  pub region: Region,
  /// Distance from the root (root = 0).
  pub depth: u32,
  /// True when the occupancy oracle reported the region as blocked.
  pub occupied: bool,
  /// Base traversal cost.
  pub cost: f32,
  /// Octant of this cell within its parent (0 for the root).
  pub(crate) octant: u8,
  pub(crate) parent: Option<CellId>,
  pub(crate) children: Option<[CellId; 8]>,
  pub(crate) neighbors: Option<[Vec<CellId>; 6]>,
}

impl SpatialCell {
  pub(crate) fn new(region: Region, depth: u32, parent: Option<CellId>, octant: u8) -> Self {
    Self {
      region,
      depth,
      occupied: false,
      cost: DEFAULT_CELL_COST,
      octant,
      parent,
      children: None,
      neighbors: None,
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  /// Free space the search may route through.
  #[inline]
  pub fn is_traversable(&self) -> bool {
    !self.occupied
  }

  #[inline]
  pub fn parent(&self) -> Option<CellId> {
    self.parent
  }

  /// The 8 children, indexed by octant. `None` for leaves.
  #[inline]
  pub fn children(&self) -> Option<&[CellId; 8]> {
    self.children.as_ref()
  }

  /// Octant of this cell within its parent.
  #[inline]
  pub fn octant(&self) -> u8 {
    self.octant
  }

  /// Leaves touching the given face. Empty for internal cells and for faces
  /// on the tree boundary.
  #[inline]
  pub fn neighbors(&self, face: Face) -> &[CellId] {
    self
      .neighbors
      .as_ref()
      .map(|lists| lists[face.index()].as_slice())
      .unwrap_or(&[])
  }

  /// True once neighbor lists have been linked (leaves only).
  #[inline]
  pub fn has_neighbor_lists(&self) -> bool {
    self.neighbors.is_some()
  }

  /// All neighbors in face order, then list order.
  pub fn all_neighbors(&self) -> impl Iterator<Item = CellId> + '_ {
    Face::ALL
      .into_iter()
      .flat_map(move |face| self.neighbors(face).iter().copied())
  }
}
