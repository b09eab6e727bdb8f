use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::prefix::PrefixSums;
use crate::reconciler::MeasureSink;

/// The estimate used when no explicit one is configured.
pub const DEFAULT_ESTIMATE: u32 = 50;

/// How unmeasured items are sized.
#[derive(Clone)]
pub enum Estimate {
    /// Every unmeasured item has the same extent.
    Fixed(u32),
    /// A per-index estimator (e.g. from a data-driven aspect ratio).
    PerIndex(Arc<dyn Fn(usize) -> u32 + Send + Sync>),
}

impl Estimate {
    pub fn per_index(f: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::PerIndex(Arc::new(f))
    }

    /// Returns the estimate for `index`, clamped to at least 1.
    pub fn get(&self, index: usize) -> u32 {
        let v = match self {
            Self::Fixed(v) => *v,
            Self::PerIndex(f) => f(index),
        };
        v.max(1)
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            (Self::PerIndex(a), Self::PerIndex(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Self::Fixed(DEFAULT_ESTIMATE)
    }
}

impl From<u32> for Estimate {
    fn from(v: u32) -> Self {
        Self::Fixed(v)
    }
}

impl core::fmt::Debug for Estimate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Self::PerIndex(_) => f.write_str("PerIndex(..)"),
        }
    }
}

/// Per-item extent bookkeeping: measured extents, estimates for the rest, and a lazily
/// recomputed prefix-sum table for offsets.
///
/// The store is the single owner of size truth. Reads never fail; an unmeasured index simply
/// reports its estimate.
#[derive(Clone, Debug)]
pub struct ExtentStore {
    estimate: Estimate,
    measured: Vec<Option<u32>>,
    sums: PrefixSums,
}

impl ExtentStore {
    pub fn new(count: usize, estimate: Estimate) -> Self {
        Self {
            estimate,
            measured: alloc::vec![None; count],
            sums: PrefixSums::new(count),
        }
    }

    pub fn count(&self) -> usize {
        self.measured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }

    pub fn estimator(&self) -> &Estimate {
        &self.estimate
    }

    /// Replaces the estimator. Measured extents are kept.
    pub fn set_estimator(&mut self, estimate: Estimate) {
        if self.estimate.same_as(&estimate) {
            return;
        }
        self.estimate = estimate;
        self.sums.mark_all_dirty();
    }

    /// Returns the measured extent if known, otherwise the estimate.
    pub fn extent(&self, index: usize) -> u32 {
        match self.measured.get(index) {
            Some(Some(v)) => *v,
            _ => self.estimate.get(index),
        }
    }

    pub fn estimate(&self, index: usize) -> u32 {
        self.estimate.get(index)
    }

    pub fn measured(&self, index: usize) -> Option<u32> {
        self.measured.get(index).copied().flatten()
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured(index).is_some()
    }

    pub fn measured_count(&self) -> usize {
        self.measured.iter().filter(|m| m.is_some()).count()
    }

    /// Records a real extent for `index` and returns the change relative to the previous
    /// extent.
    ///
    /// A zero extent, or an index outside the dataset, is ignored (returns 0) and the prior
    /// value is retained.
    pub fn set_measured(&mut self, index: usize, value: u32) -> i64 {
        if value == 0 {
            vdebug!(index, "set_measured: ignoring zero extent");
            return 0;
        }
        if index >= self.count() {
            vdebug!(index, count = self.count(), "set_measured: index out of range");
            return 0;
        }
        let cur = self.extent(index);
        self.measured[index] = Some(value);
        if cur == value {
            return 0;
        }
        self.sums.mark_dirty_after(index);
        value as i64 - cur as i64
    }

    /// Start offset of `index`: the summed extent of every item before it.
    ///
    /// Indexes at or past `count` return `total_extent()`.
    pub fn offset_of(&self, index: usize) -> u64 {
        self.sums.get(index, |i| self.extent(i))
    }

    pub fn end_of(&self, index: usize) -> u64 {
        self.offset_of(index)
            .saturating_add(self.extent(index) as u64)
    }

    pub fn total_extent(&self) -> u64 {
        self.sums.total(|i| self.extent(i))
    }

    /// Returns the index whose span contains `offset`, clamped to the last item.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        self.sums.position_of(offset, |i| self.extent(i))
    }

    /// Forgets measured extents at and after `from`.
    ///
    /// Used when the data at those positions changed in a way the caller cannot describe as
    /// an insert or remove.
    pub fn invalidate_range(&mut self, from: usize) {
        let from = from.min(self.count());
        vdebug!(from, count = self.count(), "invalidate_range");
        for m in &mut self.measured[from..] {
            *m = None;
        }
        self.sums.mark_dirty_after(from);
    }

    /// Drops every measured extent.
    pub fn reset(&mut self) {
        for m in &mut self.measured {
            *m = None;
        }
        self.sums.mark_all_dirty();
    }

    /// Grows (new items unmeasured) or shrinks the dataset.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.measured.resize(count, None);
        self.sums.resize(count);
    }

    /// Inserts `n` unmeasured items at `at`. Measurements after `at` move with their items.
    pub fn insert(&mut self, at: usize, n: usize) {
        if n == 0 {
            return;
        }
        let at = at.min(self.count());
        self.measured
            .splice(at..at, core::iter::repeat_n(None, n));
        self.sums.resize(self.measured.len());
        self.sums.mark_dirty_after(at);
    }

    /// Removes `n` items starting at `at`. Measurements after the removed block move with
    /// their items.
    pub fn remove(&mut self, at: usize, n: usize) {
        let count = self.count();
        if at >= count || n == 0 {
            return;
        }
        let end = at.saturating_add(n).min(count);
        self.measured.drain(at..end);
        self.sums.resize(self.measured.len());
        self.sums.mark_dirty_after(at);
    }

    /// Measured extents as `(index, extent)` pairs, ascending by index.
    pub fn export_measurements(&self) -> Vec<(usize, u32)> {
        self.measured
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|v| (i, v)))
            .collect()
    }

    /// Replaces measured extents. Entries outside the dataset or with zero extent are dropped.
    pub fn import_measurements(&mut self, entries: impl IntoIterator<Item = (usize, u32)>) {
        self.reset();
        for (index, value) in entries {
            if value == 0 || index >= self.count() {
                continue;
            }
            self.measured[index] = Some(value);
        }
    }
}

impl MeasureSink for ExtentStore {
    fn item_count(&self) -> usize {
        self.count()
    }

    fn record_extent(&mut self, index: usize, extent: u32) -> i64 {
        self.set_measured(index, extent)
    }
}
