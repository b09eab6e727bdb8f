#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    /// Keeps the current offset when the item is fully visible, otherwise scrolls the nearest
    /// edge into view.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Viewport geometry.
///
/// - `main` is the scroll axis size (height for vertical lists)
/// - `cross` is the other axis (width for vertical lists; drives the waterfall column count)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

impl Rect {
    pub const fn new(main: u32, cross: u32) -> Self {
        Self { main, cross }
    }
}

/// The index interval intersecting the viewport, plus the render buffer around it.
///
/// Invariant: `start <= end <= count`. The rendered set is
/// `[rendered_start(), rendered_end())`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize, // exclusive, no buffer
    pub buffer: usize,
    pub count: usize,
}

impl VisibleRange {
    pub const fn empty(buffer: usize, count: usize) -> Self {
        Self {
            start: 0,
            end: 0,
            buffer,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn rendered_start(&self) -> usize {
        if self.is_empty() {
            return self.start;
        }
        self.start.saturating_sub(self.buffer)
    }

    pub fn rendered_end(&self) -> usize {
        if self.is_empty() {
            return self.end;
        }
        self.end.saturating_add(self.buffer).min(self.count)
    }

    /// Indexes that should have a live node for this range.
    pub fn rendered(&self) -> core::ops::Range<usize> {
        self.rendered_start()..self.rendered_end()
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// A positioned item along the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualItem {
    pub index: usize,
    pub start: u64,
    pub extent: u32,
}

impl VirtualItem {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.extent as u64)
    }
}

/// Handle to a host-owned render node.
///
/// Slots carry no identity of their own: any free slot may be rebound to any index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotId(pub u32);

/// Notifications emitted by the list engines through `on_event`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListEvent {
    /// The visible interval (no buffer) changed.
    RangeChange { start: usize, end: usize },
    /// A `scroll_to_index` call finished applying its target offset.
    ScrollToIndexComplete { index: usize, offset: u64 },
}
