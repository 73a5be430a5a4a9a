//! Cooperative yield point for long searches.

use std::thread;

use web_time::Instant;

use crate::config::TimeBudget;

/// Tracks work time since the last pause and yields the thread once the
/// slice is used up. Never aborts the caller.
pub(crate) struct Pacer {
	budget: TimeBudget,
	slice_start: Instant,
	yields: u32,
}

impl Pacer {
	pub fn new(budget: TimeBudget) -> Self {
		Self {
			budget,
			slice_start: Instant::now(),
			yields: 0,
		}
	}

	/// Call once per unit of work.
	#[inline]
	pub fn checkpoint(&mut self) {
		if !self.budget.is_limited() || self.slice_start.elapsed() <= self.budget.slice {
			return;
		}

		self.yields += 1;
		if self.budget.pause.is_zero() {
			thread::yield_now();
		} else {
			thread::sleep(self.budget.pause);
		}
		self.slice_start = Instant::now();
	}

	/// Number of pauses taken.
	pub fn yields(&self) -> u32 {
		self.yields
	}
}
