use virtual_list::{Columns, ListOptions, Rect, WaterfallOptions};
use virtual_list_adapter::{Component, Registry, install};

fn main() {
    // Example: resolve components by name, as a host framework would from markup.
    let mut registry = Registry::new();
    install(&mut registry);
    println!("components: {:?}", registry.names());

    let list = registry.create(
        "EstimatedVirtualList",
        ListOptions::estimated(1_000, 40).with_initial_rect(Some(Rect::new(400, 300))),
    );
    let waterfall = registry.create(
        "VirtualWaterFallList",
        WaterfallOptions::estimated(500, Columns::Count(3), 200)
            .with_initial_rect(Some(Rect::new(800, 600))),
    );
    for component in [list, waterfall] {
        match component {
            Ok(Component::List(c)) => println!("list: count={}", c.engine().count()),
            Ok(Component::Waterfall(c)) => {
                println!("waterfall: columns={}", c.engine().column_count())
            }
            Err(e) => println!("error: {e}"),
        }
    }

    if let Err(e) = registry.create("InfiniteList", ListOptions::fixed(1, 1)) {
        println!("error: {e}");
    }
}
