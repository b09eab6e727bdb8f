use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::SlotId;

/// The host side of rendering: owns the actual nodes behind each [`SlotId`].
///
/// Call order per slot is always `bind` → `measure`; a slot is never measured with stale
/// content.
pub trait ItemHost {
    /// Binds the content of `index` into `slot` (creating the node on first use).
    fn bind(&mut self, slot: SlotId, index: usize);

    /// `slot` no longer shows `index` and went back to the free pool.
    fn release(&mut self, slot: SlotId, index: usize) {
        let _ = (slot, index);
    }

    /// Lays out `slot` and reports its real extent along the scroll axis.
    ///
    /// Returning `None` keeps the current estimate.
    fn measure(&mut self, slot: SlotId, index: usize) -> Option<u32> {
        let _ = (slot, index);
        None
    }
}

impl<H: ItemHost + ?Sized> ItemHost for &mut H {
    fn bind(&mut self, slot: SlotId, index: usize) {
        (**self).bind(slot, index);
    }

    fn release(&mut self, slot: SlotId, index: usize) {
        (**self).release(slot, index);
    }

    fn measure(&mut self, slot: SlotId, index: usize) -> Option<u32> {
        (**self).measure(slot, index)
    }
}

/// Where measured extents are written.
pub trait MeasureSink {
    fn item_count(&self) -> usize;

    /// Records `extent` for `index` and returns the applied delta.
    fn record_extent(&mut self, index: usize, extent: u32) -> i64;
}

/// What a reconcile pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub released: Vec<(usize, SlotId)>,
    pub bound: Vec<(usize, SlotId)>,
    /// Slots kept across an index shift and rebound to their new index (not re-measured).
    pub rebound: Vec<(usize, SlotId)>,
    /// `(index, delta)` for every measurement taken, including zero deltas.
    pub measured: Vec<(usize, i64)>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.released.is_empty()
            && self.bound.is_empty()
            && self.rebound.is_empty()
            && self.measured.is_empty()
    }

    /// Net extent change of measured items before `index`.
    pub fn delta_before(&self, index: usize) -> i64 {
        self.measured
            .iter()
            .filter(|(i, _)| *i < index)
            .map(|(_, d)| *d)
            .sum()
    }
}

/// Keeps the rendered `index → slot` set in sync with the wanted indexes, recycling slots
/// through a free list.
#[derive(Clone, Debug)]
pub struct Reconciler {
    bound: BTreeMap<usize, SlotId>,
    free: Vec<SlotId>,
    next_slot: u32,
    stale: BTreeSet<usize>,
    moved: BTreeSet<usize>,
    orphaned: Vec<(usize, SlotId)>,
    measure: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reconciler {
    /// `measure = false` skips the measurement step (fixed-extent lists).
    pub fn new(measure: bool) -> Self {
        Self {
            bound: BTreeMap::new(),
            free: Vec::new(),
            next_slot: 0,
            stale: BTreeSet::new(),
            moved: BTreeSet::new(),
            orphaned: Vec::new(),
            measure,
        }
    }

    pub fn measure_enabled(&self) -> bool {
        self.measure
    }

    pub fn set_measure_enabled(&mut self, measure: bool) {
        self.measure = measure;
    }

    pub fn slot_for(&self, index: usize) -> Option<SlotId> {
        self.bound.get(&index).copied()
    }

    /// Rendered `(index, slot)` pairs, ascending by index.
    pub fn rendered(&self) -> impl Iterator<Item = (usize, SlotId)> + '_ {
        self.bound.iter().map(|(&i, &s)| (i, s))
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Number of slots waiting in the free pool.
    pub fn pool_len(&self) -> usize {
        self.free.len()
    }

    /// Total number of slots ever handed out (live + pooled).
    pub fn slots_created(&self) -> u32 {
        self.next_slot
    }

    /// Flags `index` so the next pass rebinds and re-measures it (content changed or reflowed).
    pub fn invalidate_content(&mut self, index: usize) {
        if self.bound.contains_key(&index) {
            self.stale.insert(index);
        }
    }

    /// Flags every rendered index for rebind + re-measure.
    pub fn invalidate_all(&mut self) {
        self.stale.extend(self.bound.keys().copied());
    }

    /// Brings the rendered set to exactly `wanted` (indexes at or past the sink's item count
    /// are skipped), then measures newly bound and stale slots into `sink`.
    ///
    /// Leaving slots are released before entering ones are bound, so a pass never grows the
    /// pool beyond what the new set needs.
    pub fn reconcile<H, S>(
        &mut self,
        wanted: impl IntoIterator<Item = usize>,
        host: &mut H,
        sink: &mut S,
    ) -> ReconcileReport
    where
        H: ItemHost + ?Sized,
        S: MeasureSink + ?Sized,
    {
        let count = sink.item_count();
        let wanted: BTreeSet<usize> = wanted.into_iter().filter(|&i| i < count).collect();
        let mut report = ReconcileReport::default();

        for (index, slot) in core::mem::take(&mut self.orphaned) {
            host.release(slot, index);
            self.free.push(slot);
            report.released.push((index, slot));
        }

        let leaving: Vec<usize> = self
            .bound
            .keys()
            .copied()
            .filter(|i| !wanted.contains(i))
            .collect();
        for index in leaving {
            if let Some(slot) = self.bound.remove(&index) {
                self.stale.remove(&index);
                self.moved.remove(&index);
                host.release(slot, index);
                self.free.push(slot);
                report.released.push((index, slot));
            }
        }

        let mut to_measure = Vec::new();
        for &index in &wanted {
            match self.bound.get(&index) {
                Some(&slot) => {
                    let moved = self.moved.remove(&index);
                    if self.stale.remove(&index) {
                        host.bind(slot, index);
                        to_measure.push((index, slot));
                    } else if moved {
                        host.bind(slot, index);
                        report.rebound.push((index, slot));
                    }
                }
                None => {
                    let slot = self.acquire();
                    host.bind(slot, index);
                    self.bound.insert(index, slot);
                    report.bound.push((index, slot));
                    to_measure.push((index, slot));
                }
            }
        }

        if self.measure {
            for (index, slot) in to_measure {
                if let Some(extent) = host.measure(slot, index) {
                    let delta = sink.record_extent(index, extent);
                    report.measured.push((index, delta));
                }
            }
        }

        vtrace!(
            released = report.released.len(),
            bound = report.bound.len(),
            measured = report.measured.len(),
            live = self.bound.len(),
            pooled = self.free.len(),
            "reconcile"
        );
        report
    }

    /// Accepts an out-of-band measurement (e.g. from a resize observer).
    ///
    /// Only indexes that are currently rendered are accepted, so a late report for an item
    /// that was released or removed cannot overwrite newer state. Returns the applied delta,
    /// or `None` when rejected.
    pub fn report_measurement<S: MeasureSink + ?Sized>(
        &mut self,
        index: usize,
        extent: u32,
        sink: &mut S,
    ) -> Option<i64> {
        if !self.measure || !self.bound.contains_key(&index) || index >= sink.item_count() {
            vdebug!(index, extent, "report_measurement: rejected");
            return None;
        }
        Some(sink.record_extent(index, extent))
    }

    /// Releases every slot bound to an index `>= count` (dataset shrink).
    pub fn retain_below<H: ItemHost + ?Sized>(&mut self, count: usize, host: &mut H) -> usize {
        let gone = self.bound.split_off(&count);
        let n = gone.len();
        for (index, slot) in gone {
            self.stale.remove(&index);
            self.moved.remove(&index);
            host.release(slot, index);
            self.free.push(slot);
        }
        n
    }

    /// Renumbers rendered indexes after `n` items were inserted at `at`.
    ///
    /// Nodes follow their items: moved items keep their slot and measurement and are rebound
    /// to their new index on the next pass.
    pub fn shift_inserted(&mut self, at: usize, n: usize) {
        if n == 0 {
            return;
        }
        shift_set(&mut self.stale, at, 0, n, true);
        shift_set(&mut self.moved, at, 0, n, true);
        let tail = self.bound.split_off(&at);
        self.moved.extend(tail.keys().map(|&i| i.saturating_add(n)));
        self.bound
            .extend(tail.into_iter().map(|(i, s)| (i.saturating_add(n), s)));
    }

    /// Renumbers rendered indexes after `n` items were removed at `at`.
    ///
    /// Slots of removed items are released on the next pass.
    pub fn shift_removed(&mut self, at: usize, n: usize) {
        if n == 0 {
            return;
        }
        let end = at.saturating_add(n);
        let mut tail = self.bound.split_off(&at);
        let after = tail.split_off(&end);
        self.orphaned.extend(tail);
        shift_set(&mut self.stale, at, n, n, false);
        shift_set(&mut self.moved, at, n, n, false);
        self.moved.extend(after.keys().map(|&i| i - n));
        self.bound.extend(after.into_iter().map(|(i, s)| (i - n, s)));
    }

    /// Releases every rendered slot.
    pub fn clear<H: ItemHost + ?Sized>(&mut self, host: &mut H) {
        for (index, slot) in core::mem::take(&mut self.orphaned) {
            host.release(slot, index);
            self.free.push(slot);
        }
        self.retain_below(0, host);
    }

    fn acquire(&mut self) -> SlotId {
        if let Some(slot) = self.free.pop() {
            return slot;
        }
        let slot = SlotId(self.next_slot);
        self.next_slot = self.next_slot.saturating_add(1);
        slot
    }
}

// Renumbers the members of `set` at or past `at`: `removed` members starting at `at` are dropped
// and the rest move by `by` (up when `up`, down otherwise).
fn shift_set(set: &mut BTreeSet<usize>, at: usize, removed: usize, by: usize, up: bool) {
    let mut tail = set.split_off(&at);
    let after = tail.split_off(&at.saturating_add(removed));
    set.extend(after.into_iter().map(|i| {
        if up {
            i.saturating_add(by)
        } else {
            i - by
        }
    }));
}
