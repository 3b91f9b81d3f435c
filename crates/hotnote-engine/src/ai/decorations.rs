use serde::{Deserialize, Serialize};

/// Document range highlighted while AI work on it is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecorationRange {
    pub from: usize,
    pub to: usize,
}

/// Active AI highlight ranges.
///
/// Pure bookkeeping: nothing here is tied to the lifetime of a queued
/// request, callers add and remove ranges alongside their own handling.
#[derive(Debug, Default)]
pub(crate) struct Decorations {
    ranges: Vec<DecorationRange>,
}

impl Decorations {
    pub(crate) fn add(&mut self, from: usize, to: usize) {
        self.ranges.push(DecorationRange { from, to });
    }

    /// Removes every range with exactly these bounds
    pub(crate) fn remove(&mut self, from: usize, to: usize) {
        self.ranges
            .retain(|range| !(range.from == from && range.to == to));
    }

    pub(crate) fn snapshot(&self) -> Vec<DecorationRange> {
        self.ranges.clone()
    }

    pub(crate) fn clear(&mut self) {
        self.ranges.clear();
    }
}
