use virtual_list::{ItemHost, ListOptions, Rect, SlotId, VirtualList};
use virtual_list_adapter::Controller;

struct Host;

impl ItemHost for Host {
    fn bind(&mut self, _slot: SlotId, _index: usize) {}

    fn measure(&mut self, _slot: SlotId, index: usize) -> Option<u32> {
        Some(18 + (index as u32 % 7) * 3)
    }
}

fn main() {
    // Example: an adapter feeding raw UI events into the controller.
    //
    // The adapter would:
    // - forward every scroll/resize event (cheap; nothing is recomputed)
    // - call frame(now_ms, host) from its frame callback
    // - render the slots bound by the host
    let mut c = Controller::new(VirtualList::new(
        ListOptions::estimated(5_000, 24).with_initial_rect(Some(Rect::new(480, 320))),
    ))
    .with_end_reached(200, 250);

    let mut now_ms = 0u64;
    for step in 0..40u64 {
        now_ms += 16;
        // Several wheel events per frame; only the last one counts.
        for k in 0..3 {
            c.on_scroll(step * 3_000 + k * 40);
        }
        if step == 10 {
            c.on_resize(Rect::new(640, 320), now_ms);
        }
        let tick = c.frame(now_ms, &mut Host);
        if let Some(report) = tick.report {
            if step % 8 == 0 || tick.end_reached {
                println!(
                    "t={now_ms} off={} range={:?} drift={} end_reached={}",
                    c.engine().scroll_offset(),
                    report.range.rendered(),
                    report.drift,
                    tick.end_reached
                );
            }
        }
    }
}
