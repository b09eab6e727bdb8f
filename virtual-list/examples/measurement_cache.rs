// Example: persist measurements and the scroll anchor, then restore them into a fresh list.
use virtual_list::{ItemHost, ListOptions, Rect, SlotId, VirtualList};

struct Host;

impl ItemHost for Host {
    fn bind(&mut self, _slot: SlotId, _index: usize) {}

    fn measure(&mut self, _slot: SlotId, index: usize) -> Option<u32> {
        Some(16 + (index as u32 % 5) * 4)
    }
}

fn main() {
    let options = ListOptions::estimated(1_000, 20).with_initial_rect(Some(Rect::new(200, 300)));

    let mut a = VirtualList::new(options.clone());
    a.set_scroll_offset(4_000);
    while a.frame(&mut Host).extents_changed() {}
    let measurements = a.export_measurements();
    let state = a.frame_state();
    println!(
        "saved: off={} anchor={:?} measurements={}",
        a.scroll_offset(),
        state.scroll.anchor,
        measurements.len()
    );

    let mut b = VirtualList::new(options);
    b.import_measurements(measurements);
    b.restore_frame_state(state, 0);
    println!(
        "restored: off={} range={:?}",
        b.scroll_offset(),
        b.visible_range()
    );
}
