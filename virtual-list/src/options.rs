use alloc::sync::Arc;

use crate::scroll::DEFAULT_SCROLL_RESET_DELAY_MS;
use crate::{ConfigError, Estimate, ListEvent, Rect, ReflowPolicy};

/// The default number of items rendered beyond each edge of the viewport.
pub const DEFAULT_BUFFER: usize = 2;

/// A callback fired for [`ListEvent`]s.
pub type OnEventCallback = Arc<dyn Fn(&ListEvent) + Send + Sync>;

/// Initial scroll offset configuration.
#[derive(Clone)]
pub enum InitialOffset {
    Value(u64),
    /// Evaluated when the list is created (e.g. to restore a saved position).
    Provider(Arc<dyn Fn() -> u64 + Send + Sync>),
}

impl InitialOffset {
    pub(crate) fn resolve(&self) -> u64 {
        match self {
            Self::Value(v) => *v,
            Self::Provider(f) => f(),
        }
    }
}

impl Default for InitialOffset {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl core::fmt::Debug for InitialOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Configuration for [`crate::VirtualList`].
///
/// Cheap to clone: closures are stored in `Arc`s.
#[derive(Clone)]
pub struct ListOptions {
    pub count: usize,
    pub estimate: Estimate,
    /// Items rendered beyond each edge of the viewport to hide measurement pop-in.
    pub buffer: usize,
    /// Whether rendered items are measured. Off for fixed-extent lists.
    pub measure: bool,
    /// Keep the item at the top of the viewport stationary when earlier items are measured.
    pub anchor_scroll: bool,
    pub initial_rect: Option<Rect>,
    pub initial_offset: InitialOffset,
    pub scroll_reset_delay_ms: u64,
    pub on_event: Option<OnEventCallback>,
}

impl ListOptions {
    /// A list whose items all have the same known extent. Nothing is measured.
    pub fn fixed(count: usize, extent: u32) -> Self {
        Self {
            measure: false,
            ..Self::estimated(count, Estimate::Fixed(extent))
        }
    }

    /// A list whose items are measured after layout; `estimate` sizes them until then.
    pub fn estimated(count: usize, estimate: impl Into<Estimate>) -> Self {
        Self {
            count,
            estimate: estimate.into(),
            buffer: DEFAULT_BUFFER,
            measure: true,
            anchor_scroll: true,
            initial_rect: None,
            initial_offset: InitialOffset::default(),
            scroll_reset_delay_ms: DEFAULT_SCROLL_RESET_DELAY_MS,
            on_event: None,
        }
    }

    pub fn with_estimate_fn(self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            estimate: Estimate::per_index(f),
            ..self
        }
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_measure(mut self, measure: bool) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_anchor_scroll(mut self, anchor_scroll: bool) -> Self {
        self.anchor_scroll = anchor_scroll;
        self
    }

    pub fn with_initial_rect(mut self, rect: Option<Rect>) -> Self {
        self.initial_rect = rect;
        self
    }

    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(offset);
        self
    }

    pub fn with_initial_offset_provider(
        mut self,
        provider: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.initial_offset = InitialOffset::Provider(Arc::new(provider));
        self
    }

    pub fn with_scroll_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.scroll_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_on_event(mut self, f: impl Fn(&ListEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(f));
        self
    }

    /// Reports the first value that the list would clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Estimate::Fixed(0) = self.estimate {
            return Err(ConfigError::ZeroEstimate);
        }
        Ok(())
    }
}

impl core::fmt::Debug for ListOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("count", &self.count)
            .field("estimate", &self.estimate)
            .field("buffer", &self.buffer)
            .field("measure", &self.measure)
            .field("anchor_scroll", &self.anchor_scroll)
            .field("initial_rect", &self.initial_rect)
            .field("initial_offset", &self.initial_offset)
            .field("scroll_reset_delay_ms", &self.scroll_reset_delay_ms)
            .finish_non_exhaustive()
    }
}

/// How a waterfall decides its column count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Columns {
    /// A fixed number of columns; width follows the viewport.
    Count(usize),
    /// As many columns of this width as fit the viewport's cross axis.
    ItemWidth(u32),
}

impl Default for Columns {
    fn default() -> Self {
        Self::Count(2)
    }
}

/// Configuration for [`crate::WaterfallList`].
#[derive(Clone)]
pub struct WaterfallOptions {
    pub count: usize,
    pub estimate: Estimate,
    pub columns: Columns,
    /// Space between columns and between items within a column.
    pub gap: u32,
    /// Rows rendered beyond each viewport edge, per column.
    pub buffer: usize,
    pub measure: bool,
    pub anchor_scroll: bool,
    pub reflow: ReflowPolicy,
    pub initial_rect: Option<Rect>,
    pub initial_offset: InitialOffset,
    pub scroll_reset_delay_ms: u64,
    pub on_event: Option<OnEventCallback>,
}

impl WaterfallOptions {
    /// Items with known extents (`estimate` is exact). Nothing is measured.
    pub fn fixed(count: usize, columns: Columns, estimate: impl Into<Estimate>) -> Self {
        Self {
            measure: false,
            ..Self::estimated(count, columns, estimate)
        }
    }

    /// Items measured after layout.
    pub fn estimated(count: usize, columns: Columns, estimate: impl Into<Estimate>) -> Self {
        Self {
            count,
            estimate: estimate.into(),
            columns,
            gap: 0,
            buffer: DEFAULT_BUFFER,
            measure: true,
            anchor_scroll: true,
            reflow: ReflowPolicy::default(),
            initial_rect: None,
            initial_offset: InitialOffset::default(),
            scroll_reset_delay_ms: DEFAULT_SCROLL_RESET_DELAY_MS,
            on_event: None,
        }
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_reflow(mut self, reflow: ReflowPolicy) -> Self {
        self.reflow = reflow;
        self
    }

    pub fn with_anchor_scroll(mut self, anchor_scroll: bool) -> Self {
        self.anchor_scroll = anchor_scroll;
        self
    }

    pub fn with_initial_rect(mut self, rect: Option<Rect>) -> Self {
        self.initial_rect = rect;
        self
    }

    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(offset);
        self
    }

    pub fn with_on_event(mut self, f: impl Fn(&ListEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(f));
        self
    }

    /// Reports the first value that the waterfall would clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Estimate::Fixed(0) = self.estimate {
            return Err(ConfigError::ZeroEstimate);
        }
        match self.columns {
            Columns::Count(0) => Err(ConfigError::ZeroColumnCount),
            Columns::ItemWidth(0) => Err(ConfigError::ZeroItemWidth),
            _ => Ok(()),
        }
    }

    /// Column count for a viewport whose cross axis is `cross`.
    pub fn column_count_for(&self, cross: u32) -> usize {
        match self.columns {
            Columns::Count(n) => n.max(1),
            Columns::ItemWidth(w) => crate::waterfall::column_count_for(cross, w, self.gap),
        }
    }
}

impl core::fmt::Debug for WaterfallOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WaterfallOptions")
            .field("count", &self.count)
            .field("estimate", &self.estimate)
            .field("columns", &self.columns)
            .field("gap", &self.gap)
            .field("buffer", &self.buffer)
            .field("measure", &self.measure)
            .field("anchor_scroll", &self.anchor_scroll)
            .field("reflow", &self.reflow)
            .field("initial_rect", &self.initial_rect)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
