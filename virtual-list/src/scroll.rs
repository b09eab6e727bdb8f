use core::cmp;

use crate::range::max_scroll_offset;
use crate::{Align, ExtentStore, Rect, ScrollDirection, VirtualItem};

/// The default delay after the last scroll event before `is_scrolling` resets.
pub const DEFAULT_SCROLL_RESET_DELAY_MS: u64 = 150;

/// The item kept visually stationary while extents before it change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    pub index: usize,
    /// Distance from the anchor item's start to the scroll offset.
    pub offset_within_item: u64,
}

/// Owns the scroll position and viewport geometry.
///
/// Besides tracking the offset, it implements programmatic scroll-to-index and drift
/// correction: before measurements land, capture an anchor; afterwards, `correct_drift*`
/// moves the offset so the anchor item stays where the user saw it.
#[derive(Clone, Debug)]
pub struct ScrollController {
    offset: u64,
    rect: Rect,
    direction: Option<ScrollDirection>,
    is_scrolling: bool,
    last_scroll_event_ms: Option<u64>,
    reset_delay_ms: u64,
    anchor: Option<ScrollAnchor>,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(0, Rect::default())
    }
}

impl ScrollController {
    pub fn new(offset: u64, rect: Rect) -> Self {
        Self {
            offset,
            rect,
            direction: None,
            is_scrolling: false,
            last_scroll_event_ms: None,
            reset_delay_ms: DEFAULT_SCROLL_RESET_DELAY_MS,
            anchor: None,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn viewport(&self) -> u32 {
        self.rect.main
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn anchor(&self) -> Option<ScrollAnchor> {
        self.anchor
    }

    pub fn reset_delay_ms(&self) -> u64 {
        self.reset_delay_ms
    }

    pub fn set_reset_delay_ms(&mut self, delay_ms: u64) {
        self.reset_delay_ms = delay_ms;
    }

    /// Returns `true` when the rect changed.
    pub fn set_rect(&mut self, rect: Rect) -> bool {
        if self.rect == rect {
            return false;
        }
        self.rect = rect;
        true
    }

    /// Returns `true` when the offset changed.
    pub fn set_offset(&mut self, offset: u64) -> bool {
        if self.offset == offset {
            return false;
        }
        self.direction = match offset.cmp(&self.offset) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.direction,
        };
        self.offset = offset;
        true
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.direction = None;
            self.last_scroll_event_ms = None;
        }
    }

    /// Records a user scroll event at `now_ms`.
    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        self.last_scroll_event_ms = Some(now_ms);
        self.is_scrolling = true;
    }

    /// Resets `is_scrolling` once no scroll event arrived for the reset delay.
    ///
    /// Returns `true` when the state flipped.
    pub fn update_scrolling(&mut self, now_ms: u64) -> bool {
        if !self.is_scrolling {
            return false;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return false;
        };
        if now_ms.saturating_sub(last) < self.reset_delay_ms {
            return false;
        }
        self.set_is_scrolling(false);
        true
    }

    /// Computes the offset that shows `item` with the requested alignment, clamped to
    /// `[0, max_offset]`.
    pub fn offset_for_item(&self, item: VirtualItem, align: Align, max_offset: u64) -> u64 {
        let view = self.rect.main as u64;
        let target = match align {
            Align::Start => item.start,
            Align::End => item.end().saturating_sub(view),
            Align::Center => item
                .start
                .saturating_add(item.extent as u64 / 2)
                .saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.offset;
                let cur_end = cur.saturating_add(view);
                if item.start >= cur && item.end() <= cur_end {
                    cur
                } else if item.start < cur {
                    item.start
                } else {
                    item.end().saturating_sub(view)
                }
            }
        };
        target.min(max_offset)
    }

    /// Target offset for `scroll_to_index` without applying it. `None` for an empty list.
    ///
    /// Out-of-range indexes are clamped to the last item.
    pub fn scroll_to_index_offset(
        &self,
        store: &ExtentStore,
        index: usize,
        align: Align,
    ) -> Option<u64> {
        let count = store.count();
        if count == 0 {
            return None;
        }
        let index = index.min(count - 1);
        let item = VirtualItem {
            index,
            start: store.offset_of(index),
            extent: store.extent(index),
        };
        Some(self.offset_for_item(item, align, max_scroll_offset(store, self.rect.main)))
    }

    /// Programmatically scrolls to `index` and returns the applied offset.
    ///
    /// The previous anchor is dropped: the new position becomes the reference.
    pub fn scroll_to_index(&mut self, store: &ExtentStore, index: usize, align: Align) -> u64 {
        let Some(offset) = self.scroll_to_index_offset(store, index, align) else {
            return self.offset;
        };
        vdebug!(index, ?align, offset, "scroll_to_index");
        self.set_offset(offset);
        self.anchor = None;
        offset
    }

    /// Anchors on the item at the current offset.
    pub fn capture_anchor(&mut self, store: &ExtentStore) -> Option<ScrollAnchor> {
        let Some(index) = store.index_at_offset(self.offset) else {
            self.anchor = None;
            return None;
        };
        Some(self.anchor_to(index, store.offset_of(index)))
    }

    /// Anchors on `index`, whose start is currently at `item_start`.
    pub fn anchor_to(&mut self, index: usize, item_start: u64) -> ScrollAnchor {
        let anchor = ScrollAnchor {
            index,
            offset_within_item: self.offset.saturating_sub(item_start),
        };
        self.anchor = Some(anchor);
        anchor
    }

    pub fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Restores the anchor's visual position after extents changed. Returns the applied shift.
    pub fn correct_drift(&mut self, store: &ExtentStore) -> i64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        if anchor.index >= store.count() {
            self.anchor = None;
            return 0;
        }
        self.correct_drift_to(store.offset_of(anchor.index))
    }

    /// Same as [`Self::correct_drift`], with the anchor item's new start supplied by the caller
    /// (used by layouts that do not keep a single prefix-sum axis).
    pub fn correct_drift_to(&mut self, anchor_start: u64) -> i64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let target = anchor_start.saturating_add(anchor.offset_within_item);
        let shift = target as i128 - self.offset as i128;
        if shift == 0 {
            return 0;
        }
        vtrace!(
            index = anchor.index,
            from = self.offset,
            to = target,
            "correct_drift"
        );
        // Drift correction is not a user scroll: keep the current direction.
        self.offset = target;
        shift.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}
