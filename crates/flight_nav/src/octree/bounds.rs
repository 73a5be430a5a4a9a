//! Axis-aligned regions used as octree cell bounds.

use glam::Vec3;

use super::tables::OCTANT_OFFSETS;

/// Axis-aligned box described by center and half-extents.
///
/// Regions never change once created; splitting a cell produces new regions
/// for its children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
	/// Center of the box.
	pub center: Vec3,
	/// Half of the box size along each axis.
	pub half_extents: Vec3,
}

impl Region {
	/// Create a region from center and half-extents.
	///
	/// # Panics
	/// Debug-asserts that all half-extents are non-negative.
	pub fn new(center: Vec3, half_extents: Vec3) -> Self {
		debug_assert!(
			half_extents.cmpge(Vec3::ZERO).all(),
			"Region half-extents must be >= 0 on all axes"
		);
		Self {
			center,
			half_extents,
		}
	}

	/// Create a region from min and max corners.
	pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
		Self::new((min + max) * 0.5, (max - min) * 0.5)
	}

	/// Minimum corner.
	#[inline]
	pub fn min(&self) -> Vec3 {
		self.center - self.half_extents
	}

	/// Maximum corner.
	#[inline]
	pub fn max(&self) -> Vec3 {
		self.center + self.half_extents
	}

	/// Full size along each axis.
	#[inline]
	pub fn size(&self) -> Vec3 {
		self.half_extents * 2.0
	}

	/// Length of the box diagonal, the measure used for the split threshold.
	#[inline]
	pub fn diagonal_length(&self) -> f32 {
		self.size().length()
	}

	#[inline]
	pub fn volume(&self) -> f32 {
		let size = self.size();
		size.x * size.y * size.z
	}

	/// Check if the region contains a point. Boundary points count as inside.
	#[inline]
	pub fn contains_point(&self, point: Vec3) -> bool {
		(point - self.center).abs().cmple(self.half_extents).all()
	}

	/// Check if the interiors of two regions intersect.
	///
	/// Regions that only share a face, edge or corner do not overlap.
	#[inline]
	pub fn overlaps_interior(&self, other: &Region) -> bool {
		(self.center - other.center)
			.abs()
			.cmplt(self.half_extents + other.half_extents)
			.all()
	}

	/// Region of one octant of this box: half the size along each axis.
	///
	/// Octant bits select the positive side of X (bit 0), Y (bit 1), Z (bit 2).
	#[inline]
	pub fn octant(&self, octant: u8) -> Region {
		let quarter = self.half_extents * 0.5;
		Region {
			center: self.center + OCTANT_OFFSETS[octant as usize] * quarter,
			half_extents: quarter,
		}
	}
}
