//! Face-neighbor resolution across octree depths.
//!
//! For a leaf and a face direction the resolver:
//!
//! 1. **Ascends** from the leaf, pushing each octant onto a path stack, until
//!    an ancestor has a sibling across the face ([`SIBLING_TABLE`]). Reaching
//!    the root without one means the face is on the tree boundary.
//! 2. **Descends** from that sibling, popping the path stack and mirroring
//!    each octant across the face ([`REFLECT_TABLE`]), until it hits a leaf or
//!    the starting leaf's depth. The result is the single same-or-coarser cell
//!    directly across the face.
//! 3. **Collects** every leaf of that cell lying on the face opposite the
//!    search direction ([`FACE_OCTANTS`]), since the neighbor side may be
//!    subdivided more finely than the starting leaf.
//!
//! ```text
//!   depth 1      ┌───────────┬───────────┐
//!                │           │     │     │
//!   depth 2      │   leaf ──►├─────┼─────┤   Right neighbors of `leaf`:
//!                │           │  a  │     │   a, b (finer, on the Left face
//!                │           ├─────┼─────┤   of the cell across)
//!                │           │  b  │     │
//!                └───────────┴───────────┘
//! ```
//!
//! The path stack is local to each call, so resolution is reentrant and the
//! linking pass runs leaves in parallel.
//!
//! [`SIBLING_TABLE`]: super::tables::SIBLING_TABLE
//! [`REFLECT_TABLE`]: super::tables::REFLECT_TABLE
//! [`FACE_OCTANTS`]: super::tables::FACE_OCTANTS

use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::debug;

use super::tables::{reflect_octant, sibling_octant, FACE_OCTANTS};
use super::{CellId, Face, Octree};

/// Octants recorded on the way up. Inline capacity covers typical depths.
type PathStack = SmallVec<[u8; 16]>;

impl Octree {
  /// Compute neighbor lists for every leaf.
  ///
  /// Runs once at the end of [`Octree::build`]; the lists are never
  /// invalidated since the tree does not change afterwards.
  #[tracing::instrument(skip_all, name = "octree::link_neighbors")]
  pub(crate) fn link_neighbors(&mut self) {
    let leaves: Vec<CellId> = self
      .cells()
      .filter(|(_, cell)| cell.is_leaf())
      .map(|(id, _)| id)
      .collect();

    let lists: Vec<(CellId, [Vec<CellId>; 6])> = leaves
      .par_iter()
      .map(|&leaf| (leaf, Face::ALL.map(|face| self.find_face_neighbors(leaf, face))))
      .collect();

    let mut links = 0usize;
    for (leaf, neighbors) in lists {
      links += neighbors.iter().map(Vec::len).sum::<usize>();
      self.cell_mut(leaf).neighbors = Some(neighbors);
    }

    debug!(leaves = leaves.len(), links, "neighbor lists linked");
  }

  /// All leaves sharing `face` of `cell`, possibly at different depths.
  ///
  /// Empty when the face lies on the tree boundary.
  pub fn find_face_neighbors(&self, cell: CellId, face: Face) -> Vec<CellId> {
    let mut neighbors = Vec::new();
    if let Some(across) = self.cell_across(cell, face) {
      self.collect_face_leaves(across, face.opposite(), &mut neighbors);
    }
    neighbors
  }

  /// The same-or-coarser cell directly across `face` of `cell`.
  pub fn cell_across(&self, cell: CellId, face: Face) -> Option<CellId> {
    let target_depth = self.cell(cell).depth;
    let (anchor, mut path) = self.ascend_to_sibling(cell, face)?;
    Some(self.descend_mirrored(anchor, face, target_depth, &mut path))
  }

  /// Walk up until an ancestor (or the cell itself) has a sibling across
  /// `face`. Returns that sibling and the octants passed on the way up.
  fn ascend_to_sibling(&self, cell: CellId, face: Face) -> Option<(CellId, PathStack)> {
    let mut path = PathStack::new();
    let mut current = cell;

    loop {
      let node = self.cell(current);
      let parent = node.parent()?;
      if let Some(sibling) = sibling_octant(node.octant(), face) {
        let children = self.cell(parent).children()?;
        return Some((children[sibling as usize], path));
      }
      path.push(node.octant());
      current = parent;
    }
  }

  /// Follow the mirrored path down from `anchor`, stopping at a leaf or at
  /// `target_depth`.
  fn descend_mirrored(
    &self,
    anchor: CellId,
    face: Face,
    target_depth: u32,
    path: &mut PathStack,
  ) -> CellId {
    let mut current = anchor;

    while self.cell(current).depth < target_depth {
      let (Some(children), Some(octant)) = (self.cell(current).children(), path.pop()) else {
        break;
      };
      current = children[reflect_octant(octant, face) as usize];
    }

    current
  }

  /// Push every leaf of `cell`'s subtree that lies on `side`.
  fn collect_face_leaves(&self, cell: CellId, side: Face, out: &mut Vec<CellId>) {
    match self.cell(cell).children() {
      None => out.push(cell),
      Some(children) => {
        for octant in FACE_OCTANTS[side.index()] {
          self.collect_face_leaves(children[octant as usize], side, out);
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "neighbors_test.rs"]
mod neighbors_test;
