use crate::{Rect, ScrollAnchor};

/// Viewport geometry snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub rect: Rect,
}

/// Scroll position snapshot.
///
/// `anchor` records which item was at the top so a restored list can re-anchor once its
/// measurements come back, instead of trusting a raw offset computed from old extents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub offset: u64,
    pub is_scrolling: bool,
    pub anchor: Option<ScrollAnchor>,
}

/// Viewport + scroll snapshot, for restoring a list across frames or sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub viewport: ViewportState,
    pub scroll: ScrollState,
}
