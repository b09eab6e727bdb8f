// Example: estimated extents corrected by measurement, with the top item kept in place.
use virtual_list::{ItemHost, ListOptions, Rect, SlotId, VirtualList};

// Pretend layout: every third row wraps onto two lines.
struct TextHost;

impl ItemHost for TextHost {
    fn bind(&mut self, _slot: SlotId, _index: usize) {}

    fn measure(&mut self, _slot: SlotId, index: usize) -> Option<u32> {
        Some(if index % 3 == 0 { 40 } else { 20 })
    }
}

fn main() {
    let mut list = VirtualList::new(
        ListOptions::estimated(10_000, 30)
            .with_initial_rect(Some(Rect::new(300, 400)))
            .with_initial_offset(30_000),
    );
    println!(
        "before: off={} top={:?} total={}",
        list.scroll_offset(),
        list.index_at_offset(list.scroll_offset()),
        list.total_extent()
    );

    // Keep framing until measurements stop changing the layout.
    loop {
        let report = list.frame(&mut TextHost);
        println!(
            "frame: range={:?} measured={} drift={} off={}",
            report.range.rendered(),
            report.reconcile.measured.len(),
            report.drift,
            list.scroll_offset()
        );
        if !report.extents_changed() {
            break;
        }
    }

    println!(
        "after: top={:?} measured={} total={}",
        list.index_at_offset(list.scroll_offset()),
        list.store().measured_count(),
        list.total_extent()
    );
}
