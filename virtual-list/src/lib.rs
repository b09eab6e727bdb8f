//! A headless virtual list and waterfall (masonry) rendering engine.
//!
//! For host-side glue (frame/time throttles, debounced resize, component registry), see the
//! `virtual-list-adapter` crate.
//!
//! The engine keeps the number of live nodes proportional to the viewport instead of the
//! dataset. It owns the algorithms: extent bookkeeping with lazily recomputed prefix sums,
//! offset → index resolution with a render buffer, slot recycling with bind-then-measure
//! ordering, scroll-to-index and scroll-anchored drift correction, and greedy
//! shortest-column placement for waterfalls.
//!
//! It is UI-agnostic. A TUI/GUI/DOM layer is expected to provide:
//! - viewport geometry and scroll offsets
//! - an [`ItemHost`] that binds content into slots and reports measured extents
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod extent;
mod list;
mod options;
mod prefix;
pub mod range;
mod reconciler;
mod scroll;
mod state;
mod types;
pub mod waterfall;
mod waterfall_list;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use extent::{DEFAULT_ESTIMATE, Estimate, ExtentStore};
pub use list::{FrameReport, VirtualList};
pub use options::{
    Columns, DEFAULT_BUFFER, InitialOffset, ListOptions, OnEventCallback, WaterfallOptions,
};
pub use reconciler::{ItemHost, MeasureSink, ReconcileReport, Reconciler};
pub use scroll::{DEFAULT_SCROLL_RESET_DELAY_MS, ScrollAnchor, ScrollController};
pub use state::{FrameState, ScrollState, ViewportState};
pub use types::{Align, ListEvent, Rect, ScrollDirection, SlotId, VirtualItem, VisibleRange};
pub use waterfall::{ColumnAllocator, Placement, ReflowPolicy};
pub use waterfall_list::{GridItem, WaterfallList};
