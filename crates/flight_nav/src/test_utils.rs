//! Test utilities shared by the octree, search and scheduler tests.
//!
//! Provides fixture scenes with known layouts plus a seeded random scene for
//! property-style checks.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::BuildConfig;
use crate::error::OracleError;
use crate::octree::{Face, Octree, Region};
use crate::oracle::{LayerMask, ObstacleSet, OccupancyOracle};

// =============================================================================
// Fixture Scenes
// =============================================================================

/// Build config with the given minimum cell size and the default mask.
pub fn config(min_cell_size: f32) -> BuildConfig {
  BuildConfig {
    min_cell_size,
    ..BuildConfig::DEFAULT
  }
}

/// 16-unit cube centered at the origin.
pub fn cube16() -> Region {
  Region::new(Vec3::ZERO, Vec3::splat(8.0))
}

/// Obstacle filling octant 1 (+x, -y, -z) of [`cube16`] exactly.
pub fn solid_octant_obstacles() -> ObstacleSet {
  let mut set = ObstacleSet::new();
  set.add_box(Vec3::new(0.0, -8.0, -8.0), Vec3::new(8.0, 0.0, 0.0));
  set
}

/// [`cube16`] with octant 1 solid, `min_cell_size = 2`.
///
/// Layout: 7 free depth-1 leaves plus 64 blocked 2-unit leaves at depth 3.
pub fn solid_octant_tree() -> Octree {
  Octree::build(cube16(), &solid_octant_obstacles(), &config(2.0)).unwrap()
}

/// [`cube16`] with a wall at x in -1..1 spanning everything but a gap near
/// the +y top, `min_cell_size = 1`.
pub fn wall_with_gap_tree() -> Octree {
  let mut set = ObstacleSet::new();
  set.add_box(Vec3::new(-1.0, -8.0, -8.0), Vec3::new(1.0, 4.0, 8.0));
  Octree::build(cube16(), &set, &config(1.0)).unwrap()
}

/// [`cube16`] with a hollow shell around the corner cell at (4..8)^3, so the
/// corner pocket is sealed off from the rest of the volume.
pub fn sealed_pocket_tree() -> Octree {
  let mut set = ObstacleSet::new();
  // Slabs on the -x, -y and -z sides of the pocket; the tree boundary closes
  // the remaining three sides.
  set.add_box(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 8.0, 8.0));
  set.add_box(Vec3::new(2.0, 2.0, 2.0), Vec3::new(8.0, 3.0, 8.0));
  set.add_box(Vec3::new(2.0, 2.0, 2.0), Vec3::new(8.0, 8.0, 3.0));
  Octree::build(cube16(), &set, &config(0.5)).unwrap()
}

/// Seeded scatter of boxes in a 32-unit cube, `min_cell_size = 1`.
pub fn random_scene(seed: u64, count: usize) -> (Region, ObstacleSet) {
  let mut rng = StdRng::seed_from_u64(seed);
  let region = Region::new(Vec3::ZERO, Vec3::splat(16.0));
  let mut set = ObstacleSet::new();

  for _ in 0..count {
    let min = Vec3::new(
      rng.random_range(-16.0..14.0f32),
      rng.random_range(-16.0..14.0f32),
      rng.random_range(-16.0..14.0f32),
    );
    let size = Vec3::new(
      rng.random_range(0.5..6.0f32),
      rng.random_range(0.5..6.0f32),
      rng.random_range(0.5..6.0f32),
    );
    set.add_box(min, min + size);
  }

  (region, set)
}

pub fn random_tree(seed: u64) -> Octree {
  let (region, set) = random_scene(seed, 10);
  Octree::build(region, &set, &config(1.0)).unwrap()
}

// =============================================================================
// Mock Oracles
// =============================================================================

/// Blocks every region, forcing a uniform subdivision down to the minimum.
pub struct SolidOracle;

impl OccupancyOracle for SolidOracle {
  fn is_blocked(&self, _region: &Region, _mask: LayerMask) -> Result<bool, OracleError> {
    Ok(true)
  }
}

/// Blocks every region but fails for depth-1 cells on the +x side.
pub struct FlakyOracle;

impl OccupancyOracle for FlakyOracle {
  fn is_blocked(&self, region: &Region, _mask: LayerMask) -> Result<bool, OracleError> {
    if region.half_extents.x == 4.0 && region.center.x > 0.0 {
      return Err(OracleError::Query("collision service unavailable".to_string()));
    }
    Ok(true)
  }
}

// =============================================================================
// Face Geometry
// =============================================================================

/// Coordinate of the plane containing `face` of `region`.
pub fn face_plane(region: &Region, face: Face) -> f32 {
  let axis = face.axis();
  if face.is_positive() {
    region.max()[axis]
  } else {
    region.min()[axis]
  }
}

/// `face` of `region` projected onto the two axes orthogonal to it.
pub fn face_rect(region: &Region, face: Face) -> (Vec2, Vec2) {
  let (u, v) = match face.axis() {
    0 => (1, 2),
    1 => (0, 2),
    _ => (0, 1),
  };
  let (min, max) = (region.min(), region.max());
  (Vec2::new(min[u], min[v]), Vec2::new(max[u], max[v]))
}

/// Area of the intersection of two axis-aligned rectangles.
pub fn overlap_area(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> f32 {
  let size = (a.1.min(b.1) - a.0.max(b.0)).max(Vec2::ZERO);
  size.x * size.y
}

pub fn approx_eq(a: f32, b: f32) -> bool {
  (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
}
