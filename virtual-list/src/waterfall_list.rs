use alloc::vec::Vec;

use crate::reconciler::MeasureSink;
use crate::{
    Align, ColumnAllocator, ExtentStore, FrameReport, ItemHost, ListEvent, Reconciler, Rect,
    ScrollController, ScrollDirection, VirtualItem, VisibleRange, WaterfallOptions,
};

/// A positioned waterfall item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridItem {
    pub index: usize,
    pub column: usize,
    pub row: usize,
    /// Cross-axis position of the column.
    pub left: u32,
    /// Scroll-axis position within the track.
    pub top: u64,
    pub width: u32,
    pub extent: u32,
}

impl GridItem {
    pub fn bottom(&self) -> u64 {
        self.top.saturating_add(self.extent as u64)
    }
}

// Measurements land in the extent store (size truth) and are mirrored into the item's column.
struct WaterfallSink<'a> {
    store: &'a mut ExtentStore,
    columns: &'a mut ColumnAllocator,
}

impl MeasureSink for WaterfallSink<'_> {
    fn item_count(&self) -> usize {
        self.store.count()
    }

    fn record_extent(&mut self, index: usize, extent: u32) -> i64 {
        self.store.set_measured(index, extent);
        self.columns.set_extent(index, self.store.extent(index))
    }
}

/// A headless waterfall (masonry) list.
///
/// Items are placed into the shortest column in arrival order. Rendering, measurement and
/// drift correction follow [`crate::VirtualList`], except that a measurement only moves the
/// items below it in the same column (see [`crate::ReflowPolicy`]).
#[derive(Clone, Debug)]
pub struct WaterfallList {
    options: WaterfallOptions,
    store: ExtentStore,
    columns: ColumnAllocator,
    scroll: ScrollController,
    reconciler: Reconciler,
    last_range: Option<(usize, usize)>,
}

impl WaterfallList {
    pub fn new(options: WaterfallOptions) -> Self {
        let rect = options.initial_rect.unwrap_or_default();
        let column_count = options.column_count_for(rect.cross);
        vdebug!(
            count = options.count,
            column_count,
            gap = options.gap,
            "WaterfallList::new"
        );
        let store = ExtentStore::new(options.count, options.estimate.clone());
        let mut columns =
            ColumnAllocator::new(column_count, options.gap).with_policy(options.reflow);
        columns.extend((0..store.count()).map(|i| store.extent(i)));

        let mut scroll = ScrollController::new(options.initial_offset.resolve(), rect);
        scroll.set_reset_delay_ms(options.scroll_reset_delay_ms);
        let mut list = Self {
            store,
            columns,
            scroll,
            reconciler: Reconciler::new(options.measure),
            options,
            last_range: None,
        };
        list.clamp_scroll_offset();
        list
    }

    pub fn options(&self) -> &WaterfallOptions {
        &self.options
    }

    pub fn store(&self) -> &ExtentStore {
        &self.store
    }

    pub fn columns(&self) -> &ColumnAllocator {
        &self.columns
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn column_count(&self) -> usize {
        self.columns.column_count()
    }

    /// Width of each column for the current viewport.
    pub fn column_width(&self) -> u32 {
        let n = self.columns.column_count() as u64;
        let gaps = (self.options.gap as u64).saturating_mul(n.saturating_sub(1));
        let cross = self.scroll.rect().cross as u64;
        (cross.saturating_sub(gaps) / n.max(1)) as u32
    }

    pub fn column_left(&self, column: usize) -> u32 {
        let stride = self.column_width() as u64 + self.options.gap as u64;
        (stride.saturating_mul(column as u64)).min(u32::MAX as u64) as u32
    }

    pub fn set_on_event(&mut self, f: impl Fn(&ListEvent) + Send + Sync + 'static) {
        self.options.on_event = Some(alloc::sync::Arc::new(f));
    }

    fn emit(&self, event: ListEvent) {
        if let Some(cb) = &self.options.on_event {
            cb(&event);
        }
    }

    // --- viewport & scroll -------------------------------------------------------------

    pub fn rect(&self) -> Rect {
        self.scroll.rect()
    }

    /// Applies new viewport geometry. A cross-axis change that alters the column count
    /// re-allocates every item; the item at the top of the viewport stays in view.
    pub fn set_viewport(&mut self, rect: Rect) {
        if !self.scroll.set_rect(rect) {
            return;
        }
        let column_count = self.options.column_count_for(rect.cross);
        if column_count == self.columns.column_count() {
            return;
        }
        let anchor = self.top_item();
        self.columns.reflow(column_count);
        if let Some((index, within)) = anchor {
            if let Some(top) = self.columns.item_top(index) {
                self.scroll.set_offset(top.saturating_add(within));
            }
        }
        self.clamp_scroll_offset();
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

    pub fn total_extent(&self) -> u64 {
        self.columns.max_height()
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.columns
            .max_height()
            .saturating_sub(self.scroll.viewport() as u64)
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        let offset = offset.min(self.max_scroll_offset());
        self.scroll.set_offset(offset);
    }

    pub fn apply_scroll_event(&mut self, offset: u64, now_ms: u64) {
        vtrace!(offset, now_ms, "waterfall apply_scroll_event");
        self.set_scroll_offset(offset);
        self.scroll.notify_scroll_event(now_ms);
    }

    pub fn update_scrolling(&mut self, now_ms: u64) -> bool {
        self.scroll.update_scrolling(now_ms)
    }

    /// Scrolls so `index` is shown with `align` and emits
    /// [`ListEvent::ScrollToIndexComplete`]. Out-of-range indexes are clamped.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let Some(offset) = self.scroll_to_index_offset(index, align) else {
            return self.scroll.offset();
        };
        let index = index.min(self.store.count() - 1);
        self.scroll.set_offset(offset);
        self.scroll.clear_anchor();
        self.emit(ListEvent::ScrollToIndexComplete { index, offset });
        offset
    }

    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> Option<u64> {
        let count = self.store.count();
        if count == 0 {
            return None;
        }
        let index = index.min(count - 1);
        let item = VirtualItem {
            index,
            start: self.columns.item_top(index)?,
            extent: self.columns.item_extent(index)?,
        };
        Some(
            self.scroll
                .offset_for_item(item, align, self.max_scroll_offset()),
        )
    }

    // --- queries ------------------------------------------------------------------------

    pub fn item(&self, index: usize) -> Option<GridItem> {
        let placement = self.columns.placement(index)?;
        Some(GridItem {
            index,
            column: placement.column,
            row: placement.row,
            left: self.column_left(placement.column),
            top: self.columns.item_top(index)?,
            width: self.column_width(),
            extent: self.columns.item_extent(index)?,
        })
    }

    /// The span of item indexes intersecting the viewport (no buffer).
    ///
    /// Waterfall rows interleave, so the span may include indexes that are placed off-screen
    /// in another column; use [`Self::for_each_rendered_item`] for the exact set.
    pub fn visible_range(&self) -> VisibleRange {
        let count = self.store.count();
        let visible = self.columns.visible_items(
            self.scroll.offset(),
            self.scroll.viewport(),
            0,
        );
        match (visible.first(), visible.last()) {
            (Some(&start), Some(&last)) => VisibleRange {
                start,
                end: last + 1,
                buffer: self.options.buffer,
                count,
            },
            _ => VisibleRange::empty(self.options.buffer, count),
        }
    }

    /// Indexes that should be rendered: visible rows plus `buffer` rows per column, ascending.
    pub fn rendered_indexes(&self) -> Vec<usize> {
        self.columns.visible_items(
            self.scroll.offset(),
            self.scroll.viewport(),
            self.options.buffer,
        )
    }

    pub fn for_each_rendered_item(&self, mut f: impl FnMut(GridItem)) {
        for index in self.rendered_indexes() {
            if let Some(item) = self.item(index) {
                f(item);
            }
        }
    }

    pub fn column_heights(&self) -> Vec<u64> {
        self.columns.column_heights()
    }

    // --- frame --------------------------------------------------------------------------

    /// Runs one resolve pass and one reconcile pass (see [`crate::VirtualList::frame`]).
    pub fn frame<H: ItemHost + ?Sized>(&mut self, host: &mut H) -> FrameReport {
        if self.options.anchor_scroll {
            self.capture_anchor();
        }

        let range = self.visible_range();
        let wanted = self.rendered_indexes();
        let mut sink = WaterfallSink {
            store: &mut self.store,
            columns: &mut self.columns,
        };
        let reconcile = self.reconciler.reconcile(wanted, host, &mut sink);

        let drift = if self.options.anchor_scroll && !reconcile.measured.is_empty() {
            self.correct_drift()
        } else {
            0
        };

        let next = (range.start, range.end);
        if self.last_range != Some(next) {
            self.last_range = Some(next);
            self.emit(ListEvent::RangeChange {
                start: range.start,
                end: range.end,
            });
        }

        FrameReport {
            range,
            reconcile,
            drift,
        }
    }

    /// Accepts an out-of-band measurement for a rendered item and corrects drift.
    pub fn measure(&mut self, index: usize, extent: u32) -> Option<i64> {
        if self.options.anchor_scroll {
            self.capture_anchor();
        }
        let mut sink = WaterfallSink {
            store: &mut self.store,
            columns: &mut self.columns,
        };
        let delta = self
            .reconciler
            .report_measurement(index, extent, &mut sink)?;
        if self.options.anchor_scroll && delta != 0 {
            self.correct_drift();
        }
        Some(delta)
    }

    pub fn invalidate_content(&mut self, index: usize) {
        self.reconciler.invalidate_content(index);
    }

    pub fn release_all<H: ItemHost + ?Sized>(&mut self, host: &mut H) {
        self.reconciler.clear(host);
        self.last_range = None;
    }

    // --- dataset changes ----------------------------------------------------------------

    /// Appends or truncates items. Appended items are placed in arrival order with their
    /// estimates; existing placements are untouched.
    pub fn set_count(&mut self, count: usize) {
        let old = self.store.count();
        if count == old {
            return;
        }
        vdebug!(from = old, to = count, "waterfall set_count");
        if count < old {
            self.reconciler.shift_removed(count, old - count);
            self.store.set_count(count);
            self.columns.truncate(count);
        } else {
            self.store.set_count(count);
            for i in old..count {
                self.columns.push(self.store.extent(i));
            }
        }
        self.options.count = count;
        self.clamp_scroll_offset();
    }

    fn clamp_scroll_offset(&mut self) {
        let max = self.max_scroll_offset();
        if self.scroll.offset() > max {
            self.scroll.set_offset(max);
        }
    }

    /// Forgets measurements at and after `from` and re-places those items.
    pub fn invalidate_from(&mut self, from: usize) {
        let from = from.min(self.store.count());
        self.store.invalidate_range(from);
        self.columns.truncate(from);
        for i in from..self.store.count() {
            self.columns.push(self.store.extent(i));
        }
        let stale: Vec<usize> = self
            .reconciler
            .rendered()
            .map(|(i, _)| i)
            .filter(|&i| i >= from)
            .collect();
        for index in stale {
            self.reconciler.invalidate_content(index);
        }
        self.clamp_scroll_offset();
    }

    /// Drops every measurement and re-places all items with their estimates.
    pub fn reset_measurements(&mut self) {
        self.invalidate_from(0);
    }

    fn top_item(&self) -> Option<(usize, u64)> {
        let index = self.columns.item_at_offset(self.scroll.offset())?;
        let top = self.columns.item_top(index)?;
        Some((index, self.scroll.offset().saturating_sub(top)))
    }

    fn capture_anchor(&mut self) {
        match self.top_item() {
            Some((index, _)) => {
                if let Some(top) = self.columns.item_top(index) {
                    self.scroll.anchor_to(index, top);
                }
            }
            None => self.scroll.clear_anchor(),
        }
    }

    fn correct_drift(&mut self) -> i64 {
        let Some(anchor) = self.scroll.anchor() else {
            return 0;
        };
        match self.columns.item_top(anchor.index) {
            Some(top) => self.scroll.correct_drift_to(top),
            None => 0,
        }
    }
}
