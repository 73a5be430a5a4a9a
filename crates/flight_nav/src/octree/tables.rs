//! Fixed octant and face tables for splitting and neighbor lookup.
//!
//! # Octant Layout
//!
//! ```text
//!       6──────7         Octants (binary ZYX):
//!      /│     /│           0=(-,-,-)  1=(+,-,-)  2=(-,+,-)  3=(+,+,-)
//!     4─┼────5 │           4=(-,-,+)  5=(+,-,+)  6=(-,+,+)  7=(+,+,+)
//!     │ 2────┼─3
//!     │/     │/          +Y (Up)
//!     0──────1            │  +Z (Front)
//!                         │ /
//!                         └───+X (Right)
//! ```
//!
//! # Tables
//!
//! - [`SIBLING_TABLE`]: (octant, face) → sibling octant across that face inside
//!   the same parent, or `None` when the face lies on the parent boundary.
//! - [`REFLECT_TABLE`]: (face, octant) → octant mirrored across the face plane.
//!   Used when descending into a neighbor subtree along the recorded path.
//! - [`FACE_OCTANTS`]: face → the 4 octants touching that face of the parent.

use glam::Vec3;

/// Sentinel-free sibling lookup: `None` means ascend to the parent.
pub const SIBLING_TABLE: [[Option<u8>; 6]; 8] = [
  // Left     Right    Up       Down     Front    Back
  [None, Some(1), Some(2), None, Some(4), None], // 0 (-,-,-)
  [Some(0), None, Some(3), None, Some(5), None], // 1 (+,-,-)
  [None, Some(3), None, Some(0), Some(6), None], // 2 (-,+,-)
  [Some(2), None, None, Some(1), Some(7), None], // 3 (+,+,-)
  [None, Some(5), Some(6), None, None, Some(0)], // 4 (-,-,+)
  [Some(4), None, Some(7), None, None, Some(1)], // 5 (+,-,+)
  [None, Some(7), None, Some(4), None, Some(2)], // 6 (-,+,+)
  [Some(6), None, None, Some(5), None, Some(3)], // 7 (+,+,+)
];

/// Octant mirrored across the plane perpendicular to a face's axis.
pub const REFLECT_TABLE: [[u8; 8]; 6] = [
  [1, 0, 3, 2, 5, 4, 7, 6], // Left
  [1, 0, 3, 2, 5, 4, 7, 6], // Right
  [2, 3, 0, 1, 6, 7, 4, 5], // Up
  [2, 3, 0, 1, 6, 7, 4, 5], // Down
  [4, 5, 6, 7, 0, 1, 2, 3], // Front
  [4, 5, 6, 7, 0, 1, 2, 3], // Back
];

/// Octants lying on each face of a parent cell.
pub const FACE_OCTANTS: [[u8; 4]; 6] = [
  [0, 2, 4, 6], // Left  (-X)
  [1, 3, 5, 7], // Right (+X)
  [2, 3, 6, 7], // Up    (+Y)
  [0, 1, 4, 5], // Down  (-Y)
  [4, 5, 6, 7], // Front (+Z)
  [0, 1, 2, 3], // Back  (-Z)
];

/// Unit offset direction of each octant's center from the parent center.
pub const OCTANT_OFFSETS: [Vec3; 8] = [
  Vec3::new(-1.0, -1.0, -1.0),
  Vec3::new(1.0, -1.0, -1.0),
  Vec3::new(-1.0, 1.0, -1.0),
  Vec3::new(1.0, 1.0, -1.0),
  Vec3::new(-1.0, -1.0, 1.0),
  Vec3::new(1.0, -1.0, 1.0),
  Vec3::new(-1.0, 1.0, 1.0),
  Vec3::new(1.0, 1.0, 1.0),
];

/// One of the 6 axis-aligned faces of a cell.
///
/// Also indexes a leaf's neighbor lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
  /// -X
  Left = 0,
  /// +X
  Right = 1,
  /// +Y
  Up = 2,
  /// -Y
  Down = 3,
  /// +Z
  Front = 4,
  /// -Z
  Back = 5,
}

impl Face {
  /// All faces in neighbor-list order.
  pub const ALL: [Face; 6] = [
    Face::Left,
    Face::Right,
    Face::Up,
    Face::Down,
    Face::Front,
    Face::Back,
  ];

  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  #[inline]
  pub fn opposite(self) -> Face {
    match self {
      Face::Left => Face::Right,
      Face::Right => Face::Left,
      Face::Up => Face::Down,
      Face::Down => Face::Up,
      Face::Front => Face::Back,
      Face::Back => Face::Front,
    }
  }

  /// Axis index: 0 = X, 1 = Y, 2 = Z.
  #[inline]
  pub fn axis(self) -> usize {
    self.index() / 2
  }

  /// True for the +X, +Y and +Z faces.
  #[inline]
  pub fn is_positive(self) -> bool {
    matches!(self, Face::Right | Face::Up | Face::Front)
  }

  /// Outward unit normal.
  pub fn normal(self) -> Vec3 {
    let mut normal = Vec3::ZERO;
    normal[self.axis()] = if self.is_positive() { 1.0 } else { -1.0 };
    normal
  }
}

/// Sibling of `octant` across `face`, if it shares the same parent.
#[inline]
pub fn sibling_octant(octant: u8, face: Face) -> Option<u8> {
  SIBLING_TABLE[octant as usize][face.index()]
}

/// Octant mirrored across `face`'s axis.
#[inline]
pub fn reflect_octant(octant: u8, face: Face) -> u8 {
  REFLECT_TABLE[face.index()][octant as usize]
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tables_test;
