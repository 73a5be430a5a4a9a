//! Build, search and scheduling configuration.

use std::time::Duration;

use crate::error::NavError;
use crate::oracle::LayerMask;

/// Octree build parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildConfig {
	/// Cells whose diagonal is at most `2 * min_cell_size` are never split.
	pub min_cell_size: f32,
	/// Classification filter handed to the occupancy oracle.
	pub mask: LayerMask,
}

impl BuildConfig {
	pub const DEFAULT: Self = Self {
		min_cell_size: 2.0,
		mask: LayerMask::ALL,
	};

	/// Diagonal length above which a blocked cell is split.
	#[inline]
	pub fn split_diagonal(&self) -> f32 {
		self.min_cell_size * 2.0
	}

	pub fn validate(&self) -> Result<(), NavError> {
		if !self.min_cell_size.is_finite() || self.min_cell_size <= 0.0 {
			return Err(NavError::InvalidConfig(format!(
				"min_cell_size must be a positive finite number, got {}",
				self.min_cell_size
			)));
		}
		Ok(())
	}
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Cooperative time slicing for a single search.
///
/// A search that runs longer than `slice` without pausing yields its thread
/// for `pause` and then continues. It never aborts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBudget {
	/// Work time between pauses (zero = unlimited, never pause).
	pub slice: Duration,
	/// Length of each pause (zero = plain thread yield).
	pub pause: Duration,
}

impl TimeBudget {
	/// 10 ms of work, then a 1 ms pause.
	pub const DEFAULT: Self = Self {
		slice: Duration::from_millis(10),
		pause: Duration::from_millis(1),
	};

	/// Never pause.
	pub const UNLIMITED: Self = Self {
		slice: Duration::ZERO,
		pause: Duration::ZERO,
	};

	#[inline]
	pub fn is_limited(&self) -> bool {
		!self.slice.is_zero()
	}
}

impl Default for TimeBudget {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Request scheduling parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
	/// Maximum number of searches running at once. Also the worker count.
	pub max_concurrency: usize,
	/// Time slicing applied to every search.
	pub time_budget: TimeBudget,
}

impl SchedulerConfig {
	pub const DEFAULT: Self = Self {
		max_concurrency: 6,
		time_budget: TimeBudget::DEFAULT,
	};

	pub fn validate(&self) -> Result<(), NavError> {
		if self.max_concurrency == 0 {
			return Err(NavError::InvalidConfig(
				"max_concurrency must be at least 1".to_string(),
			));
		}
		Ok(())
	}
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Complete navigation configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NavConfig {
	pub build: BuildConfig,
	pub scheduler: SchedulerConfig,
}

impl NavConfig {
	pub fn validate(&self) -> Result<(), NavError> {
		self.build.validate()?;
		self.scheduler.validate()
	}
}
