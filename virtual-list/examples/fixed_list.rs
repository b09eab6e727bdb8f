// Example: a fixed-extent list with 100k rows, scrolled by offset and by index.
use virtual_list::{Align, ItemHost, ListOptions, Rect, SlotId, VirtualList};

struct PrintHost;

impl ItemHost for PrintHost {
    fn bind(&mut self, slot: SlotId, index: usize) {
        println!("  bind slot={} index={index}", slot.0);
    }
}

fn main() {
    let mut list = VirtualList::new(
        ListOptions::fixed(100_000, 24)
            .with_initial_rect(Some(Rect::new(240, 320)))
            .with_on_event(|e| println!("event: {e:?}")),
    );

    let report = list.frame(&mut PrintHost);
    println!(
        "rendered={:?} slots={} total={}",
        report.range.rendered(),
        list.reconciler().slots_created(),
        list.total_extent()
    );

    list.set_scroll_offset(48_000);
    let report = list.frame(&mut PrintHost);
    println!(
        "after scroll: range={:?} released={} bound={} pooled={}",
        report.range.rendered(),
        report.reconcile.released.len(),
        report.reconcile.bound.len(),
        list.reconciler().pool_len()
    );

    let off = list.scroll_to_index(99_999, Align::End);
    list.frame(&mut PrintHost);
    println!("scroll_to_index(last, End): off={off}");
}
