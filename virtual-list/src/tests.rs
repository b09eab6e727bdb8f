use crate::*;

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Bind(SlotId, usize),
    Release(SlotId, usize),
    Measure(SlotId, usize),
}

/// Records every call and reports `extents[index]` (or `fallback`) when measured.
#[derive(Debug, Default)]
struct MockHost {
    extents: BTreeMap<usize, u32>,
    fallback: Option<u32>,
    showing: BTreeMap<SlotId, usize>,
    ops: Vec<Op>,
}

impl MockHost {
    fn measuring(fallback: u32) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::default()
        }
    }

    fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn count(&self, f: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| f(op)).count()
    }
}

impl ItemHost for MockHost {
    fn bind(&mut self, slot: SlotId, index: usize) {
        self.showing.insert(slot, index);
        self.ops.push(Op::Bind(slot, index));
    }

    fn release(&mut self, slot: SlotId, index: usize) {
        assert_eq!(self.showing.remove(&slot), Some(index));
        self.ops.push(Op::Release(slot, index));
    }

    fn measure(&mut self, slot: SlotId, index: usize) -> Option<u32> {
        // A slot must show `index` before it is measured.
        assert_eq!(self.showing.get(&slot), Some(&index));
        self.ops.push(Op::Measure(slot, index));
        self.extents.get(&index).copied().or(self.fallback)
    }
}

fn naive_offset(extents: &[u32], index: usize) -> u64 {
    extents[..index].iter().map(|&e| e as u64).sum()
}

fn recorder() -> (Arc<Mutex<Vec<ListEvent>>>, impl Fn(&ListEvent) + Send + Sync + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |e: &ListEvent| sink.lock().unwrap().push(*e))
}

// --- extent store -------------------------------------------------------------------------

#[test]
fn offsets_are_prefix_sums_of_extents() {
    let mut store = ExtentStore::new(10, Estimate::per_index(|i| 10 + i as u32));
    store.set_measured(3, 7);
    store.set_measured(8, 100);

    assert_eq!(store.offset_of(0), 0);
    for i in 0..store.count() {
        assert_eq!(
            store.offset_of(i + 1) - store.offset_of(i),
            store.extent(i) as u64
        );
    }
    // 10+11+12+7+14+15+16+17+100+19
    assert_eq!(store.total_extent(), 221);
    assert_eq!(store.offset_of(100), store.total_extent());
}

#[test]
fn estimate_is_clamped_to_at_least_one() {
    let store = ExtentStore::new(4, Estimate::Fixed(0));
    assert_eq!(store.extent(0), 1);
    assert_eq!(store.total_extent(), 4);

    let per_index = Estimate::per_index(|i| if i == 2 { 0 } else { 5 });
    assert_eq!(per_index.get(2), 1);
    assert_eq!(per_index.get(3), 5);
}

#[test]
fn zero_and_out_of_range_measurements_are_ignored() {
    let mut store = ExtentStore::new(3, Estimate::Fixed(20));
    assert_eq!(store.set_measured(1, 35), 15);
    assert_eq!(store.set_measured(1, 0), 0);
    assert_eq!(store.extent(1), 35);
    assert_eq!(store.set_measured(3, 10), 0);
    assert_eq!(store.total_extent(), 75);
    assert_eq!(store.measured_count(), 1);
}

#[test]
fn lazy_prefix_sums_match_naive_after_random_writes() {
    let mut rng = Lcg::new(7);
    let count = 300;
    let mut store = ExtentStore::new(count, Estimate::Fixed(40));
    let mut truth = alloc::vec![40u32; count];

    for _ in 0..500 {
        let i = rng.gen_range_usize(0, count);
        let v = rng.gen_range_u32(1, 200);
        store.set_measured(i, v);
        truth[i] = v;

        let q = rng.gen_range_usize(0, count + 1);
        assert_eq!(store.offset_of(q), naive_offset(&truth, q));
    }
    assert_eq!(store.total_extent(), naive_offset(&truth, count));
}

#[test]
fn index_at_offset_finds_containing_item() {
    let mut store = ExtentStore::new(5, Estimate::Fixed(10));
    store.set_measured(2, 30);
    // starts: 0, 10, 20, 50, 60; total 70
    assert_eq!(store.index_at_offset(0), Some(0));
    assert_eq!(store.index_at_offset(9), Some(0));
    assert_eq!(store.index_at_offset(10), Some(1));
    assert_eq!(store.index_at_offset(49), Some(2));
    assert_eq!(store.index_at_offset(50), Some(3));
    // Past the end clamps to the last item.
    assert_eq!(store.index_at_offset(1_000), Some(4));
    assert_eq!(ExtentStore::new(0, Estimate::Fixed(10)).index_at_offset(0), None);
}

#[test]
fn invalidate_range_forgets_measurements_from_index() {
    let mut store = ExtentStore::new(6, Estimate::Fixed(10));
    for i in 0..6 {
        store.set_measured(i, 20);
    }
    store.invalidate_range(4);
    assert_eq!(store.measured_count(), 4);
    assert!(store.is_measured(3));
    assert!(!store.is_measured(4));
    assert_eq!(store.total_extent(), 4 * 20 + 2 * 10);

    store.reset();
    assert_eq!(store.measured_count(), 0);
    assert_eq!(store.total_extent(), 60);
}

#[test]
fn insert_and_remove_move_measurements_with_items() {
    let mut store = ExtentStore::new(4, Estimate::Fixed(10));
    store.set_measured(1, 11);
    store.set_measured(3, 33);

    store.insert(1, 2);
    assert_eq!(store.count(), 6);
    assert_eq!(store.measured(3), Some(11));
    assert_eq!(store.measured(5), Some(33));
    assert_eq!(store.measured(1), None);
    assert_eq!(store.total_extent(), 10 + 10 + 10 + 11 + 10 + 33);

    store.remove(0, 3);
    assert_eq!(store.count(), 3);
    assert_eq!(store.measured(0), Some(11));
    assert_eq!(store.measured(2), Some(33));
    assert_eq!(store.offset_of(2), 21);
}

#[test]
fn set_count_keeps_measurements_of_survivors() {
    let mut store = ExtentStore::new(5, Estimate::Fixed(10));
    store.set_measured(1, 15);
    store.set_measured(4, 25);
    store.set_count(3);
    assert_eq!(store.total_extent(), 35);
    store.set_count(5);
    assert_eq!(store.measured(4), None);
    assert_eq!(store.total_extent(), 55);
}

#[test]
fn measurements_export_and_import() {
    let mut a = ExtentStore::new(5, Estimate::Fixed(10));
    a.set_measured(0, 12);
    a.set_measured(3, 40);
    let saved = a.export_measurements();
    assert_eq!(saved, alloc::vec![(0, 12), (3, 40)]);

    let mut b = ExtentStore::new(5, Estimate::Fixed(10));
    b.import_measurements(saved.into_iter().chain([(9, 50), (2, 0)]));
    assert_eq!(b.export_measurements(), a.export_measurements());
    assert_eq!(b.total_extent(), a.total_extent());
}

// --- range resolution ---------------------------------------------------------------------

#[test]
fn fixed_list_resolves_expected_ranges() {
    let store = ExtentStore::new(1000, Estimate::Fixed(50));

    let r = range::resolve(&store, 0, 500, 2);
    assert_eq!((r.start, r.end), (0, 10));
    assert_eq!(r.rendered(), 0..12);

    let r = range::resolve(&store, 5000, 500, 2);
    assert_eq!((r.start, r.end), (100, 110));
    assert_eq!(r.rendered(), 98..112);
}

#[test]
fn empty_list_and_zero_viewport_resolve_to_empty_range() {
    let empty = ExtentStore::new(0, Estimate::Fixed(50));
    let r = range::resolve(&empty, 123, 500, 2);
    assert!(r.is_empty());
    assert!(r.rendered().is_empty());

    let store = ExtentStore::new(10, Estimate::Fixed(50));
    assert!(range::resolve(&store, 0, 0, 2).is_empty());
}

#[test]
fn overscrolled_offsets_clamp_to_track_end() {
    let store = ExtentStore::new(1000, Estimate::Fixed(50));
    assert_eq!(range::max_scroll_offset(&store, 500), 49_500);

    let r = range::resolve(&store, u64::MAX, 500, 2);
    assert_eq!((r.start, r.end), (990, 1000));
    assert_eq!(r.rendered(), 988..1000);
}

#[test]
fn short_content_renders_everything() {
    let store = ExtentStore::new(3, Estimate::Fixed(50));
    assert_eq!(range::max_scroll_offset(&store, 500), 0);
    let r = range::resolve(&store, 400, 500, 2);
    assert_eq!((r.start, r.end), (0, 3));
    assert_eq!(r.rendered(), 0..3);
}

#[test]
fn forward_scrolling_never_moves_start_backward() {
    let mut rng = Lcg::new(42);
    let mut store = ExtentStore::new(2_000, Estimate::Fixed(30));
    for i in 0..2_000 {
        store.set_measured(i, rng.gen_range_u32(5, 120));
    }

    let mut offset = 0u64;
    let mut prev = 0usize;
    for _ in 0..400 {
        offset += rng.gen_range_u64(0, 400);
        let r = range::resolve(&store, offset, 300, 3);
        assert!(r.start >= prev, "start went from {prev} to {}", r.start);
        assert!(r.start <= r.end && r.end <= r.count);
        prev = r.start;
    }
}

// --- scroll controller ----------------------------------------------------------------------

#[test]
fn scroll_to_index_start_lands_on_item_offset() {
    for from in [0u64, 1_234, 49_000] {
        let mut list = VirtualList::new(
            ListOptions::fixed(1000, 50)
                .with_initial_rect(Some(Rect::new(500, 320)))
                .with_initial_offset(from),
        );
        assert_eq!(list.scroll_to_index(500, Align::Start), 25_000);
        assert_eq!(list.scroll_offset(), list.store().offset_of(500));
        assert!(list.visible_range().contains(500));
    }
}

#[test]
fn scroll_to_index_aligns_and_clamps() {
    let list = VirtualList::new(
        ListOptions::fixed(100, 10).with_initial_rect(Some(Rect::new(50, 0))),
    );
    // item 40 spans [400, 410)
    assert_eq!(list.scroll_to_index_offset(40, Align::End), Some(360));
    assert_eq!(list.scroll_to_index_offset(40, Align::Center), Some(380));
    // The last items cannot be scrolled to the top.
    assert_eq!(list.scroll_to_index_offset(99, Align::Start), Some(950));
    // Out-of-range indexes clamp to the last item.
    assert_eq!(list.scroll_to_index_offset(5_000, Align::Start), Some(950));
}

#[test]
fn align_auto_keeps_visible_items_in_place() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_initial_offset(200),
    );
    assert_eq!(list.scroll_to_index_offset(22, Align::Auto), Some(200));
    // Before the viewport: align start. After: align end.
    assert_eq!(list.scroll_to_index_offset(10, Align::Auto), Some(100));
    assert_eq!(list.scroll_to_index_offset(30, Align::Auto), Some(260));

    list.set_scroll_offset(0);
    assert_eq!(list.scroll_to_index(4, Align::Auto), 0);
}

#[test]
fn drift_correction_keeps_anchor_item_stationary() {
    let mut store = ExtentStore::new(100, Estimate::Fixed(50));
    let mut scroll = ScrollController::new(2_520, Rect::new(500, 0));
    let anchor = scroll.capture_anchor(&store);
    assert_eq!(
        anchor,
        Some(ScrollAnchor {
            index: 50,
            offset_within_item: 20
        })
    );

    store.set_measured(10, 80);
    store.set_measured(60, 10);
    assert_eq!(scroll.correct_drift(&store), 30);
    assert_eq!(scroll.offset(), store.offset_of(50) + 20);
}

#[test]
fn scroll_direction_and_idle_reset() {
    let mut scroll = ScrollController::new(100, Rect::new(50, 0));
    scroll.set_reset_delay_ms(150);

    assert!(scroll.set_offset(200));
    assert_eq!(scroll.direction(), Some(ScrollDirection::Forward));
    scroll.notify_scroll_event(1_000);
    assert!(scroll.is_scrolling());

    assert!(scroll.set_offset(150));
    assert_eq!(scroll.direction(), Some(ScrollDirection::Backward));
    assert!(!scroll.set_offset(150));

    assert!(!scroll.update_scrolling(1_100));
    assert!(scroll.is_scrolling());
    assert!(scroll.update_scrolling(1_150));
    assert!(!scroll.is_scrolling());
    assert_eq!(scroll.direction(), None);
}

// --- reconciler -----------------------------------------------------------------------------

#[test]
fn reconcile_binds_rendered_range_then_measures() {
    let mut store = ExtentStore::new(20, Estimate::Fixed(10));
    let mut rec = Reconciler::new(true);
    let mut host = MockHost::measuring(12);

    let report = rec.reconcile(0..5, &mut host, &mut store);
    assert_eq!(report.bound.len(), 5);
    assert_eq!(report.measured.len(), 5);
    assert!(report.measured.iter().all(|&(_, d)| d == 2));

    // Every bind of the pass precedes every measure.
    let last_bind = host
        .ops
        .iter()
        .rposition(|op| matches!(op, Op::Bind(..)))
        .unwrap();
    let first_measure = host
        .ops
        .iter()
        .position(|op| matches!(op, Op::Measure(..)))
        .unwrap();
    assert!(last_bind < first_measure);
    assert_eq!(store.total_extent(), 5 * 12 + 15 * 10);
}

#[test]
fn reconcile_recycles_slots_through_the_pool() {
    let mut list = VirtualList::new(
        ListOptions::fixed(1000, 10).with_initial_rect(Some(Rect::new(100, 0))),
    );
    let mut host = MockHost::default();

    let report = list.frame(&mut host);
    assert_eq!(report.range.rendered(), 0..12);
    assert_eq!(list.reconciler().slots_created(), 12);

    list.set_scroll_offset(5_000);
    let report = list.frame(&mut host);
    assert_eq!(report.range.rendered(), 498..512);
    assert_eq!(report.reconcile.released.len(), 12);
    assert_eq!(report.reconcile.bound.len(), 14);
    // 12 slots reused from the pool, 2 new.
    assert_eq!(list.reconciler().slots_created(), 14);
    assert_eq!(list.reconciler().pool_len(), 0);

    list.set_scroll_offset(0);
    list.frame(&mut host);
    assert_eq!(list.reconciler().slots_created(), 14);
    assert_eq!(list.reconciler().pool_len(), 2);
    assert_eq!(list.reconciler().len(), 12);
}

#[test]
fn unchanged_frame_is_a_no_op() {
    let mut list = VirtualList::new(
        ListOptions::estimated(100, 20).with_initial_rect(Some(Rect::new(100, 0))),
    );
    let mut host = MockHost::measuring(20);
    list.frame(&mut host);
    host.clear_ops();

    let report = list.frame(&mut host);
    assert!(report.reconcile.is_empty());
    assert!(host.ops.is_empty());
}

#[test]
fn fixed_list_never_measures() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10).with_initial_rect(Some(Rect::new(100, 0))),
    );
    let mut host = MockHost::measuring(99);
    let report = list.frame(&mut host);
    assert!(report.reconcile.measured.is_empty());
    assert_eq!(host.count(|op| matches!(op, Op::Measure(..))), 0);
    assert_eq!(list.total_extent(), 1_000);
    assert_eq!(list.measure(3, 40), None);
}

#[test]
fn invalidated_content_is_rebound_and_remeasured() {
    let mut list = VirtualList::new(
        ListOptions::estimated(50, 10).with_initial_rect(Some(Rect::new(50, 0))),
    );
    let mut host = MockHost::measuring(10);
    list.frame(&mut host);
    host.clear_ops();

    host.extents.insert(2, 25);
    list.invalidate_content(2);
    // Not rendered: ignored.
    list.invalidate_content(40);
    let report = list.frame(&mut host);
    assert!(report.reconcile.bound.is_empty());
    assert_eq!(report.reconcile.measured, alloc::vec![(2, 15)]);
    assert_eq!(
        host.ops,
        alloc::vec![
            Op::Bind(list.reconciler().slot_for(2).unwrap(), 2),
            Op::Measure(list.reconciler().slot_for(2).unwrap(), 2),
        ]
    );
}

#[test]
fn out_of_band_measurement_requires_rendered_item() {
    let mut list = VirtualList::new(
        ListOptions::estimated(100, 10).with_initial_rect(Some(Rect::new(50, 0))),
    );
    let mut host = MockHost::default();
    list.frame(&mut host);

    assert_eq!(list.measure(1, 30), Some(20));
    assert_eq!(list.store().extent(1), 30);
    // Item 80 was never rendered; a late report must not land.
    assert_eq!(list.measure(80, 30), None);
    assert!(!list.is_measured(80));
}

// --- frame & drift ------------------------------------------------------------------------

#[test]
fn frame_measurement_above_anchor_corrects_drift() {
    let mut list = VirtualList::new(
        ListOptions::estimated(100, 50)
            .with_initial_rect(Some(Rect::new(500, 300)))
            .with_initial_offset(2_500),
    );
    let mut host = MockHost::measuring(80);

    let report = list.frame(&mut host);
    assert_eq!(report.range.rendered(), 48..62);
    // Items 48 and 49 sit above the anchor (item 50) and grew by 30 each.
    assert_eq!(report.drift, 60);
    assert_eq!(report.reconcile.delta_before(50), 60);
    assert_eq!(list.scroll_offset(), 2_560);
    assert_eq!(list.scroll_offset(), list.store().offset_of(50));
    assert!(report.extents_changed());
}

#[test]
fn drift_correction_can_be_disabled() {
    let mut list = VirtualList::new(
        ListOptions::estimated(100, 50)
            .with_initial_rect(Some(Rect::new(500, 300)))
            .with_initial_offset(2_500)
            .with_anchor_scroll(false),
    );
    let mut host = MockHost::measuring(80);
    let report = list.frame(&mut host);
    assert_eq!(report.drift, 0);
    assert_eq!(list.scroll_offset(), 2_500);
}

#[test]
fn repeated_frames_converge_on_measured_layout() {
    let mut rng = Lcg::new(3);
    let mut list = VirtualList::new(
        ListOptions::estimated(500, 40).with_initial_rect(Some(Rect::new(400, 0))),
    );
    let mut host = MockHost::default();
    for i in 0..500 {
        host.extents.insert(i, rng.gen_range_u32(10, 90));
    }

    let mut offset = 0;
    for _ in 0..60 {
        list.apply_scroll_event(offset, 0);
        let mut rounds = 0;
        while list.frame(&mut host).extents_changed() {
            rounds += 1;
            assert!(rounds < 20, "frame loop did not settle");
        }
        for (index, _) in list.reconciler().rendered() {
            assert_eq!(list.store().extent(index), host.extents[&index]);
        }
        offset = list.scroll_offset() + 300;
    }
}

// --- events ---------------------------------------------------------------------------------

#[test]
fn range_change_fires_once_per_distinct_range() {
    let (events, on_event) = recorder();
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_on_event(on_event),
    );
    let mut host = MockHost::default();

    list.frame(&mut host);
    list.frame(&mut host);
    list.set_scroll_offset(100);
    list.frame(&mut host);

    assert_eq!(
        *events.lock().unwrap(),
        alloc::vec![
            ListEvent::RangeChange { start: 0, end: 5 },
            ListEvent::RangeChange { start: 10, end: 15 },
        ]
    );
}

#[test]
fn scroll_to_index_reports_completion() {
    let (events, on_event) = recorder();
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10).with_initial_rect(Some(Rect::new(50, 0))),
    );
    list.set_on_event(on_event);

    list.scroll_to_index(30, Align::Start);
    list.scroll_to_index(1_000, Align::End);

    assert_eq!(
        *events.lock().unwrap(),
        alloc::vec![
            ListEvent::ScrollToIndexComplete {
                index: 30,
                offset: 300
            },
            ListEvent::ScrollToIndexComplete {
                index: 99,
                offset: 950
            },
        ]
    );
}

// --- dataset changes ----------------------------------------------------------------------

#[test]
fn prepending_items_keeps_viewport_on_same_content() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_initial_offset(205),
    );
    let mut host = MockHost::default();
    list.frame(&mut host);
    let before: Vec<usize> = host.showing.values().copied().collect();

    list.insert_items(0, 5);
    assert_eq!(list.count(), 105);
    assert_eq!(list.scroll_offset(), 255);

    let report = list.frame(&mut host);
    assert!(report.reconcile.bound.is_empty());
    assert!(report.reconcile.released.is_empty());
    assert_eq!(report.reconcile.rebound.len(), before.len());
    let after: Vec<usize> = host.showing.values().copied().collect();
    assert_eq!(
        after,
        before.iter().map(|i| i + 5).collect::<Vec<_>>()
    );
}

#[test]
fn removing_items_above_viewport_shifts_offset() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_initial_offset(500),
    );
    let mut host = MockHost::default();
    list.frame(&mut host);

    list.remove_items(10, 5);
    assert_eq!(list.scroll_offset(), 450);
    let report = list.frame(&mut host);
    assert!(report.reconcile.bound.is_empty());
    assert_eq!(report.range.start, 45);

    // Removing the anchor item falls back to the first survivor.
    list.remove_items(44, 3);
    assert_eq!(list.scroll_offset(), 440);
}

#[test]
fn removing_trailing_items_clamps_offset_to_track_end() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 50).with_initial_rect(Some(Rect::new(500, 0))),
    );
    let mut host = MockHost::default();
    list.set_scroll_offset(4_500);
    list.frame(&mut host);

    // The anchor (item 90) is removed with the whole tail.
    list.remove_items(90, 10);
    assert_eq!(list.max_scroll_offset(), 4_000);
    assert_eq!(list.scroll_offset(), 4_000);
    assert_eq!(list.frame_state().scroll.offset, 4_000);
    let report = list.frame(&mut host);
    assert_eq!((report.range.start, report.range.end), (80, 90));
}

#[test]
fn shrinking_count_releases_vanished_items() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_initial_offset(950),
    );
    let mut host = MockHost::default();
    assert_eq!(list.frame(&mut host).range.rendered(), 93..100);

    list.set_count(96);
    assert_eq!(list.scroll_offset(), 910);
    let report = list.frame(&mut host);
    assert_eq!(report.range.rendered(), 89..96);

    let mut released: Vec<usize> = report.reconcile.released.iter().map(|r| r.0).collect();
    released.sort_unstable();
    assert_eq!(released, alloc::vec![96, 97, 98, 99]);
    assert_eq!(report.reconcile.bound.len(), 4);
    assert!(host.showing.values().all(|&i| i < 96));
}

#[test]
fn release_all_returns_every_slot() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100, 10).with_initial_rect(Some(Rect::new(50, 0))),
    );
    let mut host = MockHost::default();
    list.frame(&mut host);
    list.release_all(&mut host);
    assert!(host.showing.is_empty());
    assert!(list.reconciler().is_empty());
    assert_eq!(list.reconciler().pool_len(), 7);
}

#[test]
fn invalidate_from_remeasures_rendered_tail() {
    let mut list = VirtualList::new(
        ListOptions::estimated(20, 10).with_initial_rect(Some(Rect::new(50, 0))),
    );
    let mut host = MockHost::measuring(15);
    list.frame(&mut host);
    host.clear_ops();

    list.invalidate_from(3);
    assert!(list.is_measured(2));
    assert!(!list.is_measured(3));
    let report = list.frame(&mut host);
    let measured: Vec<usize> = report.reconcile.measured.iter().map(|m| m.0).collect();
    assert!(measured.iter().all(|&i| i >= 3));
    assert!(measured.contains(&3));
}

// --- snapshots ----------------------------------------------------------------------------

#[test]
fn restored_frame_state_prefers_anchor_over_raw_offset() {
    let options = ListOptions::estimated(100, 50).with_initial_rect(Some(Rect::new(500, 300)));
    let mut a = VirtualList::new(options.clone());
    a.set_scroll_offset(2_510);
    let saved = a.frame_state();
    assert_eq!(
        saved.scroll.anchor,
        Some(ScrollAnchor {
            index: 50,
            offset_within_item: 10
        })
    );

    let mut b = VirtualList::new(options.with_initial_rect(None));
    b.import_measurements([(0, 100)]);
    b.restore_frame_state(saved, 0);
    assert_eq!(b.rect(), Rect::new(500, 300));
    assert_eq!(b.scroll_offset(), 2_560);
}

#[test]
fn initial_offset_provider_runs_once_at_construction() {
    let list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_initial_offset_provider(|| 320),
    );
    assert_eq!(list.scroll_offset(), 320);
    assert_eq!(list.visible_range().start, 32);
}

#[test]
fn initial_offset_past_track_end_is_clamped() {
    let list = VirtualList::new(
        ListOptions::fixed(10, 50)
            .with_initial_rect(Some(Rect::new(500, 0)))
            .with_initial_offset(1_000_000),
    );
    assert_eq!(list.max_scroll_offset(), 0);
    assert_eq!(list.scroll_offset(), 0);

    let list = VirtualList::new(
        ListOptions::fixed(100, 10)
            .with_initial_rect(Some(Rect::new(50, 0)))
            .with_initial_offset(5_000),
    );
    assert_eq!(list.scroll_offset(), 950);
    assert_eq!(list.visible_range().start, 95);
}

#[test]
fn validate_reports_clamped_values() {
    assert_eq!(
        ListOptions::fixed(10, 0).validate(),
        Err(ConfigError::ZeroEstimate)
    );
    assert_eq!(ListOptions::estimated(10, 1).validate(), Ok(()));
    assert_eq!(
        WaterfallOptions::estimated(10, Columns::Count(0), 10).validate(),
        Err(ConfigError::ZeroColumnCount)
    );
    assert_eq!(
        WaterfallOptions::estimated(10, Columns::ItemWidth(0), 10).validate(),
        Err(ConfigError::ZeroItemWidth)
    );
}

// --- waterfall ----------------------------------------------------------------------------

#[test]
fn greedy_placement_picks_shortest_column() {
    let mut alloc = ColumnAllocator::new(3, 0);
    alloc.extend([10, 10, 10, 5, 5]);
    assert_eq!(alloc.column_heights(), alloc::vec![15, 15, 10]);

    let placement = alloc.push(100);
    assert_eq!(placement, Placement { column: 2, row: 1 });
    assert_eq!(alloc.column_heights(), alloc::vec![15, 15, 110]);
    assert_eq!(alloc.max_height(), 110);
    assert_eq!(alloc.column_items(0), &[0, 3]);
}

#[test]
fn gap_separates_rows_but_not_the_column_tail() {
    let mut alloc = ColumnAllocator::new(2, 5);
    alloc.extend([10, 20, 30]);
    // col 0: 0 (top 0), 2 (top 15); col 1: 1 (top 0)
    assert_eq!(alloc.item_top(2), Some(15));
    assert_eq!(alloc.column_heights(), alloc::vec![45, 20]);
}

#[test]
fn greedy_placement_stays_balanced() {
    let mut rng = Lcg::new(11);
    for columns in 1..6 {
        let mut alloc = ColumnAllocator::new(columns, 0);
        let mut max_extent = 0;
        for _ in 0..400 {
            let e = rng.gen_range_u32(1, 300);
            max_extent = max_extent.max(e);
            alloc.push(e);
            let heights = alloc.column_heights();
            let hi = heights.iter().max().copied().unwrap();
            let lo = heights.iter().min().copied().unwrap();
            assert!(hi - lo <= max_extent as u64);
        }
    }
}

#[test]
fn measurement_only_moves_its_own_column() {
    let mut alloc = ColumnAllocator::new(3, 0);
    alloc.extend([10, 10, 10, 5, 5, 100]);
    let tops: Vec<u64> = (0..6).map(|i| alloc.item_top(i).unwrap()).collect();

    assert_eq!(alloc.set_extent(0, 20), 10);
    assert_eq!(alloc.item_top(3), Some(20));
    for i in [1, 2, 4, 5] {
        assert_eq!(alloc.item_top(i), Some(tops[i]));
        assert_eq!(alloc.placement(i).unwrap().column, i % 3);
    }
    assert_eq!(alloc.column_heights(), alloc::vec![25, 15, 110]);
    assert_eq!(alloc.set_extent(0, 0), 0);
    assert_eq!(alloc.set_extent(99, 10), 0);
}

#[test]
fn full_reflow_policy_reallocates_on_measurement() {
    let mut alloc = ColumnAllocator::new(2, 0).with_policy(ReflowPolicy::Full);
    alloc.extend([10, 10, 10]);
    assert_eq!(alloc.placement(2).unwrap().column, 0);

    alloc.set_extent(0, 50);
    assert_eq!(alloc.placement(2).unwrap().column, 1);
    assert_eq!(alloc.column_heights(), alloc::vec![50, 20]);

    let mut local = ColumnAllocator::new(2, 0);
    local.extend([10, 10, 10]);
    local.set_extent(0, 50);
    assert_eq!(local.placement(2).unwrap().column, 0);
    assert_eq!(local.column_heights(), alloc::vec![60, 10]);
}

#[test]
fn truncate_pops_column_tails() {
    let mut alloc = ColumnAllocator::new(3, 0);
    alloc.extend([10, 10, 10, 5, 5, 100]);
    alloc.truncate(4);
    assert_eq!(alloc.len(), 4);
    assert_eq!(alloc.column_heights(), alloc::vec![15, 10, 10]);
    // Next push continues from the truncated state.
    assert_eq!(alloc.push(1).column, 1);
}

#[test]
fn column_count_follows_item_width() {
    assert_eq!(waterfall::column_count_for(1000, 200, 10), 4);
    assert_eq!(waterfall::column_count_for(100, 200, 0), 1);
    assert_eq!(waterfall::column_count_for(600, 0, 0), 600);
    assert_eq!(
        WaterfallOptions::estimated(0, Columns::Count(0), 10).column_count_for(1000),
        1
    );
}

fn three_column_waterfall() -> WaterfallList {
    WaterfallList::new(
        WaterfallOptions::estimated(30, Columns::Count(3), 100)
            .with_gap(5)
            .with_initial_rect(Some(Rect::new(300, 310))),
    )
}

#[test]
fn waterfall_geometry_and_visible_items() {
    let list = three_column_waterfall();
    assert_eq!(list.column_width(), 100);
    assert_eq!(list.column_left(2), 210);
    assert_eq!(list.total_extent(), 1_045);

    let range = list.visible_range();
    assert_eq!((range.start, range.end), (0, 9));
    assert_eq!(list.rendered_indexes(), (0..15).collect::<Vec<_>>());

    let item = list.item(7).unwrap();
    assert_eq!((item.column, item.row), (1, 2));
    assert_eq!((item.left, item.top, item.bottom()), (105, 210, 310));
}

#[test]
fn waterfall_drift_follows_anchor_column() {
    let mut list = three_column_waterfall();
    list.set_scroll_offset(525);
    let mut host = MockHost::measuring(100);
    host.extents.insert(9, 150);

    let report = list.frame(&mut host);
    // Item 9 (column 0, row 3) grew above the anchor (item 15, column 0, row 5).
    assert_eq!(report.drift, 50);
    assert_eq!(list.scroll_offset(), 575);
    assert_eq!(list.columns().item_top(15), Some(575));
    assert_eq!(list.columns().item_top(16), Some(525));
    assert_eq!(list.column_heights(), alloc::vec![1_095, 1_045, 1_045]);
}

#[test]
fn waterfall_resize_reflows_when_column_count_changes() {
    let mut list = WaterfallList::new(
        WaterfallOptions::fixed(30, Columns::ItemWidth(100), 100)
            .with_initial_rect(Some(Rect::new(300, 300))),
    );
    assert_eq!(list.column_count(), 3);
    assert_eq!(list.total_extent(), 1_000);

    list.set_scroll_offset(500);
    list.set_viewport(Rect::new(300, 200));
    assert_eq!(list.column_count(), 2);
    assert_eq!(list.total_extent(), 1_500);
    // Item 15 was the top item (column 0, row 5); it is now row 7 of column 1.
    assert_eq!(list.scroll_offset(), 700);

    // Same column count: no reflow.
    list.set_viewport(Rect::new(400, 250));
    assert_eq!(list.column_count(), 2);
    assert_eq!(list.scroll_offset(), 700);
}

#[test]
fn waterfall_initial_offset_is_clamped() {
    let list = WaterfallList::new(
        WaterfallOptions::fixed(30, Columns::Count(3), 100)
            .with_initial_rect(Some(Rect::new(300, 300)))
            .with_initial_offset(10_000),
    );
    assert_eq!(list.total_extent(), 1_000);
    assert_eq!(list.scroll_offset(), 700);
    assert_eq!(list.scroll_offset(), list.max_scroll_offset());
}

#[test]
fn waterfall_set_count_appends_and_truncates() {
    let mut list = WaterfallList::new(
        WaterfallOptions::fixed(3, Columns::Count(3), 10)
            .with_initial_rect(Some(Rect::new(100, 300))),
    );
    list.set_count(7);
    assert_eq!(list.columns().len(), 7);
    assert_eq!(list.column_heights(), alloc::vec![30, 20, 20]);

    list.set_count(2);
    assert_eq!(list.columns().len(), 2);
    assert_eq!(list.column_heights(), alloc::vec![10, 10, 0]);
}

#[test]
fn waterfall_scroll_to_index_uses_item_top() {
    let (events, on_event) = recorder();
    let mut list = three_column_waterfall();
    list.set_on_event(on_event);

    // Item 13: column 1, row 4, top 420.
    assert_eq!(list.scroll_to_index(13, Align::Start), 420);
    assert_eq!(list.scroll_to_index(29, Align::Start), 745);
    assert_eq!(
        events.lock().unwrap().last().copied(),
        Some(ListEvent::ScrollToIndexComplete {
            index: 29,
            offset: 745
        })
    );
}

#[test]
fn waterfall_reset_measurements_restores_estimates() {
    let mut list = three_column_waterfall();
    let mut host = MockHost::measuring(40);
    list.frame(&mut host);
    assert!(list.total_extent() < 1_045);

    list.reset_measurements();
    assert_eq!(list.total_extent(), 1_045);
    assert_eq!(list.store().measured_count(), 0);
}
