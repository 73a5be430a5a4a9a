//! Min-priority frontier for the best-first search.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::octree::CellId;

/// One frontier entry.
///
/// Entries are never updated in place; an improved weight pushes a new entry
/// and the old one is skipped when popped.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrontierEntry {
  pub priority: f32,
  /// Accumulated weight when the entry was pushed.
  pub weight: f32,
  pub cell: CellId,
  seq: u64,
}

impl PartialEq for FrontierEntry {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for FrontierEntry {
  /// Priority first, then insertion order so equal priorities pop FIFO.
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .priority
      .total_cmp(&other.priority)
      .then(self.seq.cmp(&other.seq))
  }
}

#[derive(Debug, Default)]
pub(crate) struct Frontier {
  heap: BinaryHeap<Reverse<FrontierEntry>>,
  next_seq: u64,
  peak: usize,
}

impl Frontier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, cell: CellId, priority: f32, weight: f32) {
    let seq = self.next_seq;
    self.next_seq += 1;
    self.heap.push(Reverse(FrontierEntry {
      priority,
      weight,
      cell,
      seq,
    }));
    self.peak = self.peak.max(self.heap.len());
  }

  /// Remove the lowest-priority entry.
  pub fn pop(&mut self) -> Option<FrontierEntry> {
    self.heap.pop().map(|Reverse(entry)| entry)
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.heap.len()
  }

  /// Largest size reached so far.
  pub fn peak(&self) -> usize {
    self.peak
  }
}
