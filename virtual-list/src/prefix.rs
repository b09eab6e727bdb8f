use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// A lazily maintained prefix-sum table.
///
/// `sums[i]` is the sum of the first `i` values. Entries below `dirty_from` are valid; writes
/// only lower `dirty_from` (O(1)), and queries extend the valid prefix just far enough to answer.
/// The values themselves live with the owner and are passed in through a `value(i)` closure.
#[derive(Clone, Debug)]
pub(crate) struct PrefixSums {
    sums: RefCell<Vec<u64>>,
    dirty_from: Cell<usize>,
}

impl PrefixSums {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            sums: RefCell::new(alloc::vec![0; len + 1]),
            dirty_from: Cell::new(1),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sums.borrow().len().saturating_sub(1)
    }

    /// Resizes the table to `len` values. Sums up to the old/new boundary stay valid.
    pub(crate) fn resize(&mut self, len: usize) {
        let old = self.len();
        self.sums.get_mut().resize(len + 1, 0);
        self.mark_dirty_after(old.min(len));
    }

    /// Marks every sum that includes the value at `index` as stale.
    pub(crate) fn mark_dirty_after(&self, index: usize) {
        let from = index.saturating_add(1);
        if from < self.dirty_from.get() {
            self.dirty_from.set(from);
        }
    }

    pub(crate) fn mark_all_dirty(&self) {
        self.dirty_from.set(1);
    }

    /// Sum of the first `count` values (clamped to `len`).
    pub(crate) fn get(&self, count: usize, value: impl Fn(usize) -> u32) -> u64 {
        let count = count.min(self.len());
        self.ensure(count, value);
        self.sums.borrow()[count]
    }

    pub(crate) fn total(&self, value: impl Fn(usize) -> u32) -> u64 {
        self.get(self.len(), value)
    }

    /// Returns the position `p` (`0 <= p < len`) whose span `[sums[p], sums[p + 1])` contains
    /// `target`. Targets past the end map to the last position. Returns `None` when empty.
    ///
    /// Values are expected to be non-zero so the table is strictly increasing; zero-sized
    /// values resolve to the last position sharing that sum.
    pub(crate) fn position_of(&self, target: u64, value: impl Fn(usize) -> u32) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.ensure(len, value);
        let sums = self.sums.borrow();
        // Number of sums <= target; sums[0] == 0 so this is at least 1.
        let consumed = sums.partition_point(|&s| s <= target);
        Some(consumed.saturating_sub(1).min(len - 1))
    }

    fn ensure(&self, upto: usize, value: impl Fn(usize) -> u32) {
        let from = self.dirty_from.get();
        if upto < from {
            return;
        }
        let mut sums = self.sums.borrow_mut();
        let mut acc = sums[from - 1];
        for i in from..=upto {
            acc = acc.saturating_add(value(i - 1) as u64);
            sums[i] = acc;
        }
        self.dirty_from.set(upto + 1);
    }
}
