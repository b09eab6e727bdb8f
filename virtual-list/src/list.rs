use alloc::vec::Vec;

use crate::range::{clamp_offset, max_scroll_offset, resolve};
use crate::state::{FrameState, ScrollState, ViewportState};
use crate::{
    Align, Estimate, ExtentStore, ItemHost, ListEvent, ListOptions, ReconcileReport, Reconciler,
    Rect, ScrollAnchor, ScrollController, ScrollDirection, VirtualItem, VisibleRange,
};

/// Outcome of one frame pass: the resolved range, what the reconciler did, and how far drift
/// correction moved the scroll offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub range: VisibleRange,
    pub reconcile: ReconcileReport,
    pub drift: i64,
}

impl FrameReport {
    /// Whether measurements changed any extent (another frame may expose new items).
    pub fn extents_changed(&self) -> bool {
        self.reconcile.measured.iter().any(|&(_, d)| d != 0)
    }
}

/// A headless, single-axis virtual list.
///
/// Covers both the fixed and the estimated variants (see [`ListOptions::fixed`] and
/// [`ListOptions::estimated`]). The list holds no UI objects: the host feeds it viewport
/// geometry and scroll offsets and calls [`Self::frame`] once per rendered frame with an
/// [`ItemHost`] that binds and measures the nodes behind each slot.
#[derive(Clone, Debug)]
pub struct VirtualList {
    options: ListOptions,
    store: ExtentStore,
    scroll: ScrollController,
    reconciler: Reconciler,
    last_range: Option<(usize, usize)>,
}

impl VirtualList {
    pub fn new(options: ListOptions) -> Self {
        vdebug!(
            count = options.count,
            buffer = options.buffer,
            measure = options.measure,
            "VirtualList::new"
        );
        let mut scroll = ScrollController::new(
            options.initial_offset.resolve(),
            options.initial_rect.unwrap_or_default(),
        );
        scroll.set_reset_delay_ms(options.scroll_reset_delay_ms);
        let mut list = Self {
            store: ExtentStore::new(options.count, options.estimate.clone()),
            reconciler: Reconciler::new(options.measure),
            scroll,
            options,
            last_range: None,
        };
        list.clamp_scroll_offset();
        list
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Read access to extent bookkeeping. Writes go through `frame`/`measure` and the dataset
    /// methods.
    pub fn store(&self) -> &ExtentStore {
        &self.store
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn set_on_event(&mut self, f: impl Fn(&ListEvent) + Send + Sync + 'static) {
        self.options.on_event = Some(alloc::sync::Arc::new(f));
    }

    pub fn set_buffer(&mut self, buffer: usize) {
        self.options.buffer = buffer;
    }

    pub fn set_estimate(&mut self, estimate: Estimate) {
        self.store.set_estimator(estimate.clone());
        self.options.estimate = estimate;
    }

    pub fn set_measure_enabled(&mut self, measure: bool) {
        self.options.measure = measure;
        self.reconciler.set_measure_enabled(measure);
    }

    fn emit(&self, event: ListEvent) {
        if let Some(cb) = &self.options.on_event {
            cb(&event);
        }
    }

    fn emit_range_change(&mut self, range: VisibleRange) {
        let next = (range.start, range.end);
        if self.last_range == Some(next) {
            return;
        }
        self.last_range = Some(next);
        self.emit(ListEvent::RangeChange {
            start: range.start,
            end: range.end,
        });
    }

    // --- viewport & scroll -------------------------------------------------------------

    pub fn rect(&self) -> Rect {
        self.scroll.rect()
    }

    pub fn viewport_extent(&self) -> u32 {
        self.scroll.viewport()
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.scroll.set_rect(rect);
    }

    pub fn set_viewport_extent(&mut self, main: u32) {
        let rect = Rect {
            main,
            ..self.scroll.rect()
        };
        self.scroll.set_rect(rect);
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll.offset()
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll.direction()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling()
    }

    /// Sets the scroll offset (clamped to the track) without marking the list as scrolling.
    pub fn set_scroll_offset(&mut self, offset: u64) {
        let offset = clamp_offset(&self.store, offset, self.scroll.viewport());
        self.scroll.set_offset(offset);
    }

    /// Applies a user scroll event (wheel/drag) reported by the host at `now_ms`.
    pub fn apply_scroll_event(&mut self, offset: u64, now_ms: u64) {
        vtrace!(offset, now_ms, "apply_scroll_event");
        self.set_scroll_offset(offset);
        self.scroll.notify_scroll_event(now_ms);
    }

    /// Resets `is_scrolling` after the configured quiet period.
    pub fn update_scrolling(&mut self, now_ms: u64) -> bool {
        self.scroll.update_scrolling(now_ms)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        max_scroll_offset(&self.store, self.scroll.viewport())
    }

    /// Scrolls so `index` is shown with `align` and emits
    /// [`ListEvent::ScrollToIndexComplete`]. Out-of-range indexes are clamped.
    ///
    /// Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        if self.store.is_empty() {
            return self.scroll.offset();
        }
        let index = index.min(self.store.count() - 1);
        let offset = self.scroll.scroll_to_index(&self.store, index, align);
        self.emit(ListEvent::ScrollToIndexComplete { index, offset });
        offset
    }

    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> Option<u64> {
        self.scroll
            .scroll_to_index_offset(&self.store, index, align)
    }

    // --- queries ------------------------------------------------------------------------

    pub fn visible_range(&self) -> VisibleRange {
        self.visible_range_for(self.scroll.offset(), self.scroll.viewport())
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport: u32) -> VisibleRange {
        resolve(&self.store, scroll_offset, viewport, self.options.buffer)
    }

    pub fn total_extent(&self) -> u64 {
        self.store.total_extent()
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        self.store.index_at_offset(offset)
    }

    pub fn item(&self, index: usize) -> Option<VirtualItem> {
        (index < self.store.count()).then(|| VirtualItem {
            index,
            start: self.store.offset_of(index),
            extent: self.store.extent(index),
        })
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.store.is_measured(index)
    }

    /// Iterates the items of the current rendered range (visible + buffer).
    pub fn for_each_virtual_item(&self, mut f: impl FnMut(VirtualItem)) {
        let range = self.visible_range();
        let rendered = range.rendered();
        if rendered.is_empty() {
            return;
        }
        let mut start = self.store.offset_of(rendered.start);
        for index in rendered {
            let extent = self.store.extent(index);
            f(VirtualItem {
                index,
                start,
                extent,
            });
            start = start.saturating_add(extent as u64);
        }
    }

    /// Collects the current rendered items into `out` (clears `out` first).
    pub fn collect_virtual_items(&self, out: &mut Vec<VirtualItem>) {
        out.clear();
        self.for_each_virtual_item(|it| out.push(it));
    }

    // --- frame --------------------------------------------------------------------------

    /// Runs one resolve pass and one reconcile pass.
    ///
    /// Order within the frame: anchor capture → resolve → release/bind → measure (writes the
    /// extent store) → drift correction. Newly measured extents are therefore visible to the
    /// next frame's resolve, never stale.
    pub fn frame<H: ItemHost + ?Sized>(&mut self, host: &mut H) -> FrameReport {
        if self.options.anchor_scroll {
            self.scroll.capture_anchor(&self.store);
        }

        let range = self.visible_range();
        let reconcile = self
            .reconciler
            .reconcile(range.rendered(), host, &mut self.store);

        let drift = if self.options.anchor_scroll && !reconcile.measured.is_empty() {
            self.scroll.correct_drift(&self.store)
        } else {
            0
        };

        self.emit_range_change(range);
        FrameReport {
            range,
            reconcile,
            drift,
        }
    }

    /// Accepts an out-of-band measurement for a rendered item and corrects drift.
    ///
    /// Returns the extent delta, or `None` if the item is not rendered (the report is stale).
    pub fn measure(&mut self, index: usize, extent: u32) -> Option<i64> {
        if self.options.anchor_scroll {
            self.scroll.capture_anchor(&self.store);
        }
        let delta = self
            .reconciler
            .report_measurement(index, extent, &mut self.store)?;
        if self.options.anchor_scroll && delta != 0 {
            self.scroll.correct_drift(&self.store);
        }
        Some(delta)
    }

    /// Flags a rendered item whose content changed; the next frame rebinds and re-measures it.
    pub fn invalidate_content(&mut self, index: usize) {
        self.reconciler.invalidate_content(index);
    }

    /// Releases every rendered slot (e.g. when the host tears the list down).
    pub fn release_all<H: ItemHost + ?Sized>(&mut self, host: &mut H) {
        self.reconciler.clear(host);
        self.last_range = None;
    }

    // --- dataset changes ----------------------------------------------------------------

    /// Grows or shrinks the dataset. Items past the new end are released on the next frame.
    pub fn set_count(&mut self, count: usize) {
        let old = self.store.count();
        if count == old {
            return;
        }
        vdebug!(from = old, to = count, "set_count");
        if count < old {
            self.reconciler.shift_removed(count, old - count);
        }
        self.store.set_count(count);
        self.options.count = count;
        self.clamp_scroll_offset();
    }

    /// Inserts `n` items at `at`. The item at the top of the viewport stays in place.
    pub fn insert_items(&mut self, at: usize, n: usize) {
        if n == 0 {
            return;
        }
        let at = at.min(self.store.count());
        let anchor = self.current_anchor();
        self.store.insert(at, n);
        self.reconciler.shift_inserted(at, n);
        self.options.count = self.store.count();
        if let Some(mut anchor) = anchor {
            if anchor.index >= at {
                anchor.index += n;
            }
            self.restore_anchor(anchor);
        }
        self.clamp_scroll_offset();
    }

    /// Removes `n` items at `at`. If the anchor item was removed, the first survivor after
    /// the removed block becomes the anchor.
    pub fn remove_items(&mut self, at: usize, n: usize) {
        let count = self.store.count();
        if at >= count || n == 0 {
            return;
        }
        let n = n.min(count - at);
        let anchor = self.current_anchor();
        self.store.remove(at, n);
        self.reconciler.shift_removed(at, n);
        self.options.count = self.store.count();
        if let Some(mut anchor) = anchor {
            if anchor.index >= at + n {
                anchor.index -= n;
            } else if anchor.index >= at {
                anchor = ScrollAnchor {
                    index: at,
                    offset_within_item: 0,
                };
            }
            self.restore_anchor(anchor);
        }
        // A removed tail leaves the anchor past the end; fall back to the track end.
        self.clamp_scroll_offset();
    }

    /// Forgets measurements at and after `from` and re-measures rendered items there.
    pub fn invalidate_from(&mut self, from: usize) {
        self.store.invalidate_range(from);
        let stale: Vec<usize> = self
            .reconciler
            .rendered()
            .map(|(i, _)| i)
            .filter(|&i| i >= from)
            .collect();
        for index in stale {
            self.reconciler.invalidate_content(index);
        }
    }

    /// Drops every measurement; rendered items are re-measured on the next frame.
    pub fn reset_measurements(&mut self) {
        self.store.reset();
        self.reconciler.invalidate_all();
        self.clamp_scroll_offset();
    }

    pub fn export_measurements(&self) -> Vec<(usize, u32)> {
        self.store.export_measurements()
    }

    pub fn import_measurements(&mut self, entries: impl IntoIterator<Item = (usize, u32)>) {
        let anchor = self.current_anchor();
        self.store.import_measurements(entries);
        if let Some(anchor) = anchor {
            self.restore_anchor(anchor);
        }
        self.clamp_scroll_offset();
    }

    fn current_anchor(&self) -> Option<ScrollAnchor> {
        if !self.options.anchor_scroll {
            return None;
        }
        let index = self.store.index_at_offset(self.scroll.offset())?;
        Some(ScrollAnchor {
            index,
            offset_within_item: self
                .scroll
                .offset()
                .saturating_sub(self.store.offset_of(index)),
        })
    }

    fn restore_anchor(&mut self, anchor: ScrollAnchor) {
        if anchor.index >= self.store.count() {
            return;
        }
        let target = self
            .store
            .offset_of(anchor.index)
            .saturating_add(anchor.offset_within_item);
        self.scroll.set_offset(target.min(self.max_scroll_offset()));
    }

    fn clamp_scroll_offset(&mut self) {
        let max = self.max_scroll_offset();
        if self.scroll.offset() > max {
            self.scroll.set_offset(max);
        }
    }

    // --- snapshots ----------------------------------------------------------------------

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: ViewportState {
                rect: self.scroll.rect(),
            },
            scroll: ScrollState {
                offset: self.scroll.offset(),
                is_scrolling: self.scroll.is_scrolling(),
                anchor: self.current_anchor(),
            },
        }
    }

    /// Restores a snapshot. When it carries an anchor that still exists, the anchor wins over
    /// the raw offset.
    pub fn restore_frame_state(&mut self, frame: FrameState, now_ms: u64) {
        self.scroll.set_rect(frame.viewport.rect);
        match frame.scroll.anchor {
            Some(anchor) if anchor.index < self.store.count() => self.restore_anchor(anchor),
            _ => self.set_scroll_offset(frame.scroll.offset),
        }
        if frame.scroll.is_scrolling {
            self.scroll.notify_scroll_event(now_ms);
        } else {
            self.scroll.set_is_scrolling(false);
        }
    }
}
