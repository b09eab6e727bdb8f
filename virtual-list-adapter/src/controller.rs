use virtual_list::{Align, FrameReport, ItemHost, Rect, VirtualList, WaterfallList};

use crate::{Debounce, FrameThrottle, Throttle, Ticket};

/// Resize bursts settle for this long before the layout is recomputed.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 100;
/// Minimum spacing between two end-reached signals.
pub const DEFAULT_END_REACHED_THROTTLE_MS: u64 = 200;

/// The engine surface the [`Controller`] drives. Implemented for [`VirtualList`] and
/// [`WaterfallList`].
pub trait ListEngine {
    fn frame<H: ItemHost + ?Sized>(&mut self, host: &mut H) -> FrameReport;
    fn apply_scroll_event(&mut self, offset: u64, now_ms: u64);
    fn update_scrolling(&mut self, now_ms: u64) -> bool;
    fn set_viewport(&mut self, rect: Rect);
    fn rect(&self) -> Rect;
    fn measure(&mut self, index: usize, extent: u32) -> Option<i64>;
    fn scroll_to_index(&mut self, index: usize, align: Align) -> u64;
    fn scroll_offset(&self) -> u64;
    fn max_scroll_offset(&self) -> u64;
    fn count(&self) -> usize;
}

macro_rules! impl_list_engine {
    ($ty:ty) => {
        impl ListEngine for $ty {
            fn frame<H: ItemHost + ?Sized>(&mut self, host: &mut H) -> FrameReport {
                <$ty>::frame(self, host)
            }

            fn apply_scroll_event(&mut self, offset: u64, now_ms: u64) {
                <$ty>::apply_scroll_event(self, offset, now_ms)
            }

            fn update_scrolling(&mut self, now_ms: u64) -> bool {
                <$ty>::update_scrolling(self, now_ms)
            }

            fn set_viewport(&mut self, rect: Rect) {
                <$ty>::set_viewport(self, rect)
            }

            fn rect(&self) -> Rect {
                <$ty>::rect(self)
            }

            fn measure(&mut self, index: usize, extent: u32) -> Option<i64> {
                <$ty>::measure(self, index, extent)
            }

            fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
                <$ty>::scroll_to_index(self, index, align)
            }

            fn scroll_offset(&self) -> u64 {
                <$ty>::scroll_offset(self)
            }

            fn max_scroll_offset(&self) -> u64 {
                <$ty>::max_scroll_offset(self)
            }

            fn count(&self) -> usize {
                <$ty>::count(self)
            }
        }
    };
}

impl_list_engine!(VirtualList);
impl_list_engine!(WaterfallList);

/// What one [`Controller::frame`] call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// The frame pass, if one ran (nothing changed otherwise).
    pub report: Option<FrameReport>,
    /// The viewport came within the end-reached threshold (throttled).
    pub end_reached: bool,
}

/// A framework-neutral controller that wraps a list engine and coalesces host events into at
/// most one resolve + reconcile pass per frame.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_scroll` / `on_resize` when UI events occur (cheap; nothing is recomputed)
/// - `frame(now_ms, host)` from the host's frame callback
/// - `report_measurement` for measurements that arrive outside the frame (resize observers)
#[derive(Clone, Debug)]
pub struct Controller<L> {
    engine: L,
    scroll: FrameThrottle<u64>,
    resize: Debounce<Rect>,
    end_reached: Throttle<()>,
    end_threshold: Option<u64>,
    frame_ticket: Ticket,
    needs_frame: bool,
}

impl<L: ListEngine> Controller<L> {
    pub fn new(engine: L) -> Self {
        Self {
            engine,
            scroll: FrameThrottle::new(),
            resize: Debounce::new(DEFAULT_RESIZE_DEBOUNCE_MS),
            end_reached: Throttle::new(DEFAULT_END_REACHED_THROTTLE_MS),
            end_threshold: None,
            frame_ticket: Ticket::default(),
            // The first frame always renders.
            needs_frame: true,
        }
    }

    pub fn with_resize_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.resize = Debounce::new(delay_ms);
        self
    }

    /// Signals [`Tick::end_reached`] when the viewport end comes within `threshold` of the
    /// track end, at most once per `throttle_ms`.
    pub fn with_end_reached(mut self, threshold: u64, throttle_ms: u64) -> Self {
        self.end_threshold = Some(threshold);
        self.end_reached = Throttle::new(throttle_ms);
        self
    }

    pub fn engine(&self) -> &L {
        &self.engine
    }

    /// Direct engine access. Call [`Self::request_frame`] after changing anything that affects
    /// layout.
    pub fn engine_mut(&mut self) -> &mut L {
        &mut self.engine
    }

    pub fn into_engine(self) -> L {
        self.engine
    }

    /// Ticket of the latest frame pass. Hosts that measure asynchronously attach it to their
    /// reports so results computed against an older layout are dropped.
    pub fn frame_ticket(&self) -> Ticket {
        self.frame_ticket
    }

    pub fn is_frame_pending(&self) -> bool {
        self.needs_frame || self.scroll.is_pending()
    }

    pub fn request_frame(&mut self) {
        self.needs_frame = true;
    }

    /// Records a scroll offset reported by the UI. Bursts within one frame collapse to the
    /// last offset.
    pub fn on_scroll(&mut self, offset: u64) -> Ticket {
        self.scroll.schedule(offset)
    }

    /// Records new viewport geometry. Applied once resizing has been quiet for the debounce
    /// delay.
    pub fn on_resize(&mut self, rect: Rect, now_ms: u64) -> Ticket {
        self.resize.trigger(rect, now_ms)
    }

    /// Applies a programmatic scroll immediately, dropping any pending user scroll.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        self.scroll.cancel();
        self.needs_frame = true;
        self.engine.scroll_to_index(index, align)
    }

    /// Drops every pending scroll/resize and resets the end-reached throttle.
    pub fn cancel(&mut self) {
        self.scroll.cancel();
        self.resize.cancel();
        self.end_reached.cancel();
    }

    /// Runs the frame: applies the coalesced scroll and any settled resize, then performs at
    /// most one resolve + reconcile pass.
    pub fn frame<H: ItemHost + ?Sized>(&mut self, now_ms: u64, host: &mut H) -> Tick {
        if let Some(rect) = self.resize.poll(now_ms) {
            if rect != self.engine.rect() {
                adebug!(main = rect.main, cross = rect.cross, "apply resize");
                self.engine.set_viewport(rect);
                self.needs_frame = true;
            }
        }
        if let Some(offset) = self.scroll.on_frame() {
            self.engine.apply_scroll_event(offset, now_ms);
            self.needs_frame = true;
        }
        self.engine.update_scrolling(now_ms);

        if !self.needs_frame {
            return Tick::default();
        }

        let report = self.engine.frame(host);
        self.frame_ticket = self.frame_ticket.next();
        // Grown or shrunk items may expose new ones; settle on the next frame.
        self.needs_frame = report.extents_changed();
        atrace!(
            start = report.range.start,
            end = report.range.end,
            drift = report.drift,
            again = self.needs_frame,
            "frame"
        );

        let end_reached = self.check_end_reached(now_ms);
        Tick {
            report: Some(report),
            end_reached,
        }
    }

    /// Accepts a measurement taken against the frame identified by `ticket`.
    ///
    /// Reports from an older frame, or for items no longer rendered, are dropped.
    pub fn report_measurement(&mut self, ticket: Ticket, index: usize, extent: u32) -> Option<i64> {
        if ticket != self.frame_ticket {
            atrace!(index, "report_measurement: stale ticket");
            return None;
        }
        let delta = self.engine.measure(index, extent)?;
        if delta != 0 {
            self.needs_frame = true;
        }
        Some(delta)
    }

    fn check_end_reached(&mut self, now_ms: u64) -> bool {
        let Some(threshold) = self.end_threshold else {
            return false;
        };
        if self.engine.count() == 0 {
            return false;
        }
        let remaining = self
            .engine
            .max_scroll_offset()
            .saturating_sub(self.engine.scroll_offset());
        remaining <= threshold && self.end_reached.trigger((), now_ms).is_some()
    }
}
