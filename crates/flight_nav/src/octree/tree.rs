//! Octree - arena of cells built breadth-first from an occupancy oracle.

use std::collections::VecDeque;

use glam::Vec3;
use tracing::{debug, warn};
use web_time::Instant;

use super::{CellId, Region, SpatialCell};
use crate::config::BuildConfig;
use crate::error::NavError;
use crate::oracle::OccupancyOracle;

/// Counters gathered while building and linking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
  /// Total cells allocated (internal + leaves).
  pub cell_count: usize,
  /// Cells without children.
  pub leaf_count: usize,
  /// Leaves the oracle reported as blocked.
  pub occupied_leaf_count: usize,
  /// Occupancy queries that failed and were treated as blocked.
  pub oracle_failures: usize,
  /// Depth of the deepest cell.
  pub max_depth: u32,
  /// Subdivision time in microseconds.
  pub build_us: u64,
  /// Neighbor linking time in microseconds.
  pub link_us: u64,
}

/// Read-only view of a leaf for external inspection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafView {
  pub id: CellId,
  pub region: Region,
  pub depth: u32,
  pub occupied: bool,
}

/// Immutable spatial partition with leaf adjacency.
#[derive(Clone, Debug)]
pub struct Octree {
  cells: Vec<SpatialCell>,
  config: BuildConfig,
  stats: BuildStats,
}

impl Octree {
  /// Build the tree covering `region`.
  ///
  /// Breadth-first: each dequeued cell is classified by the oracle, and a
  /// blocked cell whose diagonal exceeds `2 * min_cell_size` is split into 8
  /// children which are queued in turn. Free cells are never split.
  ///
  /// An oracle failure marks the cell blocked and leaves it unsplit, so the
  /// partition stays total.
  ///
  /// Neighbor lists are linked before returning.
  ///
  /// Fails with [`NavError::InvalidConfig`] if `config` does not validate or
  /// `region` has a non-positive or non-finite extent.
  #[tracing::instrument(skip_all, name = "octree::build")]
  pub fn build<O>(region: Region, oracle: &O, config: &BuildConfig) -> Result<Self, NavError>
  where
    O: OccupancyOracle + ?Sized,
  {
    config.validate()?;
    if !region.center.is_finite()
      || !region.half_extents.is_finite()
      || !region.half_extents.cmpgt(Vec3::ZERO).all()
    {
      return Err(NavError::InvalidConfig(format!(
        "region must be finite with positive half-extents, got {:?}",
        region
      )));
    }

    let build_start = Instant::now();
    let mut tree = Self {
      cells: vec![SpatialCell::new(region, 0, None, 0)],
      config: *config,
      stats: BuildStats {
        cell_count: 1,
        ..Default::default()
      },
    };

    let split_diagonal = config.split_diagonal();
    let mut to_split = VecDeque::new();
    to_split.push_back(CellId::ROOT);

    while let Some(id) = to_split.pop_front() {
      let cell_region = tree.cells[id.index()].region;
      let (occupied, failed) = match oracle.is_blocked(&cell_region, config.mask) {
        Ok(blocked) => (blocked, false),
        Err(err) => {
          warn!(cell = id.raw(), %err, "occupancy query failed, treating cell as blocked");
          tree.stats.oracle_failures += 1;
          (true, true)
        }
      };
      tree.cells[id.index()].occupied = occupied;

      if occupied && !failed && cell_region.diagonal_length() > split_diagonal {
        to_split.extend(tree.split(id));
      }
    }

    tree.stats.build_us = build_start.elapsed().as_micros() as u64;

    for cell in tree.cells.iter().filter(|cell| cell.is_leaf()) {
      tree.stats.leaf_count += 1;
      if cell.occupied {
        tree.stats.occupied_leaf_count += 1;
      }
      tree.stats.max_depth = tree.stats.max_depth.max(cell.depth);
    }

    let link_start = Instant::now();
    tree.link_neighbors();
    tree.stats.link_us = link_start.elapsed().as_micros() as u64;

    debug!(
      cells = tree.stats.cell_count,
      leaves = tree.stats.leaf_count,
      occupied_leaves = tree.stats.occupied_leaf_count,
      max_depth = tree.stats.max_depth,
      build_us = tree.stats.build_us,
      link_us = tree.stats.link_us,
      "octree built"
    );

    Ok(tree)
  }

  /// Allocate the 8 children of a leaf, turning it into an internal node.
  fn split(&mut self, id: CellId) -> [CellId; 8] {
    let (region, depth) = {
      let parent = &self.cells[id.index()];
      debug_assert!(parent.is_leaf(), "cell {:?} split twice", id);
      (parent.region, parent.depth)
    };

    let base = self.cells.len();
    let children: [CellId; 8] = std::array::from_fn(|i| CellId::from_index(base + i));
    for octant in 0..8u8 {
      self.cells.push(SpatialCell::new(
        region.octant(octant),
        depth + 1,
        Some(id),
        octant,
      ));
    }

    self.cells[id.index()].children = Some(children);
    self.stats.cell_count += 8;
    children
  }

  /// The cell covering the whole volume.
  #[inline]
  pub fn root(&self) -> CellId {
    CellId::ROOT
  }

  /// Bounds of the whole tree.
  #[inline]
  pub fn region(&self) -> Region {
    self.cells[CellId::ROOT.index()].region
  }

  /// Get a cell by id.
  ///
  /// # Panics
  /// Panics if `id` does not belong to this tree.
  #[inline]
  pub fn cell(&self, id: CellId) -> &SpatialCell {
    &self.cells[id.index()]
  }

  #[inline]
  pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut SpatialCell {
    &mut self.cells[id.index()]
  }

  /// Number of cells (internal + leaves).
  #[inline]
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  /// Always false: a built tree has at least its root.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn stats(&self) -> &BuildStats {
    &self.stats
  }

  /// Iterate over all cells with their ids.
  pub fn cells(&self) -> impl Iterator<Item = (CellId, &SpatialCell)> {
    self
      .cells
      .iter()
      .enumerate()
      .map(|(index, cell)| (CellId::from_index(index), cell))
  }

  /// Iterate over leaves for debug drawing or export.
  pub fn leaves(&self) -> impl Iterator<Item = LeafView> + '_ {
    self
      .cells()
      .filter(|(_, cell)| cell.is_leaf())
      .map(|(id, cell)| LeafView {
        id,
        region: cell.region,
        depth: cell.depth,
        occupied: cell.occupied,
      })
  }

  /// Find the leaf containing `point`.
  ///
  /// Only the root bounds reject a point. Below the root the child is picked
  /// by comparing the point with the parent center on each axis, so sibling
  /// bounds that differ by rounding never leave a gap. A point on a
  /// splitting plane goes to the negative side, i.e. the lowest-index
  /// octant. Returns `None` outside the tree bounds.
  pub fn locate(&self, point: Vec3) -> Option<CellId> {
    let mut current = CellId::ROOT;
    if !self.cell(current).region.contains_point(point) {
      return None;
    }

    while let Some(children) = self.cell(current).children() {
      current = children[octant_of(self.cell(current).region.center, point)];
    }

    Some(current)
  }
}

/// Octant of `point` relative to `center`: bit i set when strictly on the
/// positive side of axis i.
#[inline]
fn octant_of(center: Vec3, point: Vec3) -> usize {
  point.cmpgt(center).bitmask() as usize
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
