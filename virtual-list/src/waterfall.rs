//! Greedy shortest-column allocation for waterfall (masonry) layouts.
//!
//! Items arrive in index order and each one goes to the column that is currently shortest
//! (ties break to the lowest column). This is an online heuristic, not optimal bin packing:
//! items must be placed before later ones are known. It keeps the tallest and shortest
//! columns within one item extent (plus gap) of each other.

use alloc::vec::Vec;

use crate::prefix::PrefixSums;

/// What happens to the layout when an already placed item changes extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReflowPolicy {
    /// Only the item's own column shifts; other columns keep their layout. O(1) amortized.
    #[default]
    AffectedColumn,
    /// Every item is re-allocated from scratch with the current extents.
    Full,
}

/// Where an item lives: its column and its position within that column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub column: usize,
    pub row: usize,
}

/// Number of columns of width `item_width` (separated by `gap`) that fit into `viewport_cross`.
///
/// Always at least 1; a zero `item_width` is treated as 1.
pub fn column_count_for(viewport_cross: u32, item_width: u32, gap: u32) -> usize {
    let item_width = item_width.max(1) as u64;
    let stride = item_width + gap as u64;
    // n columns need n * item_width + (n - 1) * gap.
    let n = (viewport_cross as u64 + gap as u64) / stride;
    (n as usize).max(1)
}

#[derive(Clone, Debug)]
struct Column {
    items: Vec<usize>,
    extents: Vec<u32>,
    // Prefix sums over `extent + gap`, so `sums[row]` is the row's top.
    sums: PrefixSums,
}

impl Column {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            extents: Vec::new(),
            sums: PrefixSums::new(0),
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn top(&self, row: usize, gap: u32) -> u64 {
        self.sums.get(row, |r| self.extents[r].saturating_add(gap))
    }

    fn height(&self, gap: u32) -> u64 {
        if self.items.is_empty() {
            return 0;
        }
        self.top(self.len(), gap).saturating_sub(gap as u64)
    }

    fn push(&mut self, index: usize, extent: u32) -> usize {
        let row = self.items.len();
        self.items.push(index);
        self.extents.push(extent);
        self.sums.resize(self.items.len());
        row
    }

    fn pop(&mut self) {
        self.items.pop();
        self.extents.pop();
        self.sums.resize(self.items.len());
    }

    /// Row whose span contains `offset`, clamped to the last row.
    fn row_at(&self, offset: u64, gap: u32) -> Option<usize> {
        self.sums
            .position_of(offset, |r| self.extents[r].saturating_add(gap))
    }
}

/// Assigns items to columns and tracks per-column heights.
#[derive(Clone, Debug)]
pub struct ColumnAllocator {
    columns: Vec<Column>,
    placements: Vec<Placement>,
    gap: u32,
    policy: ReflowPolicy,
}

impl ColumnAllocator {
    /// A zero `column_count` is clamped to 1.
    pub fn new(column_count: usize, gap: u32) -> Self {
        let column_count = column_count.max(1);
        Self {
            columns: (0..column_count).map(|_| Column::new()).collect(),
            placements: Vec::new(),
            gap,
            policy: ReflowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ReflowPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ReflowPolicy) {
        self.policy = policy;
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn gap(&self) -> u32 {
        self.gap
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// The currently shortest column (lowest index on ties).
    pub fn shortest_column(&self) -> usize {
        let mut best = 0usize;
        let mut best_height = u64::MAX;
        for (c, col) in self.columns.iter().enumerate() {
            let h = col.height(self.gap);
            if h < best_height {
                best = c;
                best_height = h;
            }
        }
        best
    }

    /// Places the next item (index `len()`) and returns where it went.
    pub fn push(&mut self, extent: u32) -> Placement {
        let extent = extent.max(1);
        let index = self.placements.len();
        let column = self.shortest_column();
        let row = self.columns[column].push(index, extent);
        let placement = Placement { column, row };
        self.placements.push(placement);
        vtrace!(index, extent, column, row, "waterfall push");
        placement
    }

    pub fn extend(&mut self, extents: impl IntoIterator<Item = u32>) {
        for extent in extents {
            self.push(extent);
        }
    }

    /// Removes every item at or past `len`.
    ///
    /// Columns hold ascending indexes, so this only pops column tails.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.placements.len() {
            return;
        }
        for col in &mut self.columns {
            while col.items.last().is_some_and(|&i| i >= len) {
                col.pop();
            }
        }
        self.placements.truncate(len);
    }

    /// Drops every item and sets a new column count (clamped to at least 1).
    pub fn reset(&mut self, column_count: usize) {
        let column_count = column_count.max(1);
        self.columns.clear();
        self.columns.extend((0..column_count).map(|_| Column::new()));
        self.placements.clear();
    }

    /// Re-allocates every item from scratch with `column_count` columns, keeping extents.
    pub fn reflow(&mut self, column_count: usize) {
        let extents: Vec<u32> = (0..self.len())
            .filter_map(|i| self.item_extent(i))
            .collect();
        vdebug!(items = extents.len(), column_count, "waterfall reflow");
        self.reset(column_count);
        self.extend(extents);
    }

    /// Updates the extent of a placed item and returns the change.
    ///
    /// Under [`ReflowPolicy::AffectedColumn`], items after it in the same column shift and
    /// every other column is untouched. Zero extents and unknown indexes are ignored.
    pub fn set_extent(&mut self, index: usize, extent: u32) -> i64 {
        if extent == 0 {
            return 0;
        }
        let Some(&Placement { column, row }) = self.placements.get(index) else {
            return 0;
        };
        let col = &mut self.columns[column];
        let cur = col.extents[row];
        if cur == extent {
            return 0;
        }
        col.extents[row] = extent;
        col.sums.mark_dirty_after(row);
        if self.policy == ReflowPolicy::Full {
            self.reflow(self.columns.len());
        }
        extent as i64 - cur as i64
    }

    pub fn placement(&self, index: usize) -> Option<Placement> {
        self.placements.get(index).copied()
    }

    pub fn item_extent(&self, index: usize) -> Option<u32> {
        let p = self.placements.get(index)?;
        Some(self.columns[p.column].extents[p.row])
    }

    /// Top of `index` within its column.
    pub fn item_top(&self, index: usize) -> Option<u64> {
        let p = self.placements.get(index)?;
        Some(self.columns[p.column].top(p.row, self.gap))
    }

    /// Item indexes of `column`, top to bottom.
    pub fn column_items(&self, column: usize) -> &[usize] {
        self.columns
            .get(column)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn column_height(&self, column: usize) -> u64 {
        self.columns
            .get(column)
            .map(|c| c.height(self.gap))
            .unwrap_or(0)
    }

    pub fn column_heights(&self) -> Vec<u64> {
        self.columns.iter().map(|c| c.height(self.gap)).collect()
    }

    /// Height of the tallest column (the scroll track length).
    pub fn max_height(&self) -> u64 {
        self.columns
            .iter()
            .map(|c| c.height(self.gap))
            .max()
            .unwrap_or(0)
    }

    /// Per-column row ranges intersecting `[offset, offset + viewport)`, each expanded by
    /// `buffer` rows. Emits `(column, rows)`; columns with no visible rows are skipped.
    pub fn for_each_visible_rows(
        &self,
        offset: u64,
        viewport: u32,
        buffer: usize,
        mut f: impl FnMut(usize, core::ops::Range<usize>),
    ) {
        if viewport == 0 {
            return;
        }
        let last = offset.saturating_add(viewport as u64 - 1);
        for (c, col) in self.columns.iter().enumerate() {
            let len = col.len();
            if len == 0 || col.height(self.gap) <= offset {
                continue;
            }
            let Some(start) = col.row_at(offset, self.gap) else {
                continue;
            };
            let end = col.row_at(last, self.gap).map(|r| r + 1).unwrap_or(len);
            let start = start.saturating_sub(buffer);
            let end = end.saturating_add(buffer).min(len);
            if start < end {
                f(c, start..end);
            }
        }
    }

    /// Item indexes intersecting the viewport (plus `buffer` rows per column), ascending.
    pub fn visible_items(&self, offset: u64, viewport: u32, buffer: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_visible_rows(offset, viewport, buffer, |c, rows| {
            out.extend_from_slice(&self.columns[c].items[rows]);
        });
        out.sort_unstable();
        out
    }

    /// First item (lowest index) whose span contains `offset`, across all columns.
    pub fn item_at_offset(&self, offset: u64) -> Option<usize> {
        self.columns
            .iter()
            .filter(|c| c.len() > 0 && c.height(self.gap) > offset)
            .filter_map(|c| c.row_at(offset, self.gap).map(|r| c.items[r]))
            .min()
    }
}
