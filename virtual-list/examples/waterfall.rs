// Example: a three-column waterfall, reflowed when the viewport narrows.
use virtual_list::{Columns, ItemHost, Rect, SlotId, WaterfallList, WaterfallOptions};

struct CardHost;

impl ItemHost for CardHost {
    fn bind(&mut self, _slot: SlotId, _index: usize) {}

    fn measure(&mut self, _slot: SlotId, index: usize) -> Option<u32> {
        Some(120 + (index as u32 * 37) % 90)
    }
}

fn main() {
    let mut list = WaterfallList::new(
        WaterfallOptions::estimated(200, Columns::ItemWidth(180), 150)
            .with_gap(8)
            .with_initial_rect(Some(Rect::new(600, 560))),
    );
    println!(
        "columns={} width={}",
        list.column_count(),
        list.column_width()
    );

    while list.frame(&mut CardHost).extents_changed() {}
    list.for_each_rendered_item(|item| {
        if item.row < 2 {
            println!(
                "  #{} col={} row={} left={} top={} h={}",
                item.index, item.column, item.row, item.left, item.top, item.extent
            );
        }
    });
    println!("heights={:?}", list.column_heights());

    list.set_viewport(Rect::new(600, 370));
    while list.frame(&mut CardHost).extents_changed() {}
    println!(
        "narrowed: columns={} heights={:?}",
        list.column_count(),
        list.column_heights()
    );
}
