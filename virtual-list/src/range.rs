//! Scroll offset → visible index range.

use crate::{ExtentStore, VisibleRange};

/// Largest offset that still fills the viewport.
pub fn max_scroll_offset(store: &ExtentStore, viewport: u32) -> u64 {
    store.total_extent().saturating_sub(viewport as u64)
}

pub fn clamp_offset(store: &ExtentStore, offset: u64, viewport: u32) -> u64 {
    offset.min(max_scroll_offset(store, viewport))
}

/// Resolves the items intersecting `[scroll_offset, scroll_offset + viewport)`.
///
/// `start` is the first item whose end lies past `scroll_offset`; `end` is one past the last
/// item starting before the viewport end. Offsets outside the track are clamped. An empty
/// dataset or a zero-sized viewport yields an empty range.
pub fn resolve(
    store: &ExtentStore,
    scroll_offset: u64,
    viewport: u32,
    buffer: usize,
) -> VisibleRange {
    let count = store.count();
    if count == 0 || viewport == 0 {
        return VisibleRange::empty(buffer, count);
    }

    let offset = clamp_offset(store, scroll_offset, viewport);
    let last_visible = offset.saturating_add(viewport as u64 - 1);

    let start = store.index_at_offset(offset).unwrap_or(0);
    let end = store
        .index_at_offset(last_visible)
        .map(|i| i + 1)
        .unwrap_or(count)
        .min(count);

    vtrace!(scroll_offset, offset, viewport, start, end, "resolve");
    VisibleRange {
        start,
        end: end.max(start),
        buffer,
        count,
    }
}
