//! Occupancy oracle - the collision query the octree build consumes.
//!
//! The build asks [`OccupancyOracle::is_blocked`] exactly once per cell. The
//! physics or collision service behind it lives outside this crate; the
//! [`ObstacleSet`] here is a plain box-list implementation for tools and tests.

use glam::Vec3;

use crate::error::OracleError;
use crate::octree::Region;

/// Bit set of collision layers that count as blocking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
  pub const ALL: LayerMask = LayerMask(u32::MAX);
  pub const NONE: LayerMask = LayerMask(0);

  /// Mask containing a single layer (0..32).
  #[inline]
  pub const fn layer(layer: u32) -> LayerMask {
    LayerMask(1 << layer)
  }

  #[inline]
  pub fn intersects(self, other: LayerMask) -> bool {
    self.0 & other.0 != 0
  }
}

impl Default for LayerMask {
  fn default() -> Self {
    Self::ALL
  }
}

/// Region occupancy query.
///
/// Must answer consistently within one build and be safe to call from any
/// thread.
pub trait OccupancyOracle: Send + Sync {
  /// True if anything matching `mask` occupies part of `region`.
  fn is_blocked(&self, region: &Region, mask: LayerMask) -> Result<bool, OracleError>;
}

/// Blanket impl for boxed trait objects.
impl OccupancyOracle for Box<dyn OccupancyOracle> {
  fn is_blocked(&self, region: &Region, mask: LayerMask) -> Result<bool, OracleError> {
    (**self).is_blocked(region, mask)
  }
}

/// Oracle backed by an infallible closure. The mask is ignored.
pub struct FnOracle<F>(pub F);

impl<F> OccupancyOracle for FnOracle<F>
where
  F: Fn(&Region) -> bool + Send + Sync,
{
  fn is_blocked(&self, region: &Region, _mask: LayerMask) -> Result<bool, OracleError> {
    Ok((self.0)(region))
  }
}

/// Solid axis-aligned box on a collision layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
  pub bounds: Region,
  pub layers: LayerMask,
}

/// Static list of solid boxes.
///
/// A region is blocked when its interior intersects an obstacle whose layers
/// match the query mask. Faces that merely touch an obstacle stay free.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
  obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a box spanning `min..max` on every layer.
  pub fn add_box(&mut self, min: Vec3, max: Vec3) -> &mut Self {
    self.add(Obstacle {
      bounds: Region::from_min_max(min, max),
      layers: LayerMask::ALL,
    })
  }

  pub fn add(&mut self, obstacle: Obstacle) -> &mut Self {
    self.obstacles.push(obstacle);
    self
  }

  pub fn len(&self) -> usize {
    self.obstacles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.obstacles.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
    self.obstacles.iter()
  }
}

impl FromIterator<Obstacle> for ObstacleSet {
  fn from_iter<I: IntoIterator<Item = Obstacle>>(iter: I) -> Self {
    Self {
      obstacles: iter.into_iter().collect(),
    }
  }
}

impl OccupancyOracle for ObstacleSet {
  fn is_blocked(&self, region: &Region, mask: LayerMask) -> Result<bool, OracleError> {
    Ok(
      self
        .obstacles
        .iter()
        .any(|obstacle| obstacle.layers.intersects(mask) && obstacle.bounds.overlaps_interior(region)),
    )
  }
}
