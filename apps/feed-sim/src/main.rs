//! Simulated scrolling feed.
//!
//! Stands in for a real UI layer: a fixed-height item list, a viewport that
//! scrolls over it, and a console "renderer" that reports every time the
//! engine allows an item to render. Run with `RUST_LOG=debug` to see the
//! engine's listener bookkeeping as well.

use std::cell::Cell;
use std::rc::Rc;

use web_time::Instant;

use lazyview_core::platform::{EventKind, ListenerHost, ListenerOptions, ScrollTarget};
use lazyview_core::{LayoutProbe, LazyViewer, OffsetSpec, Rect, Size, WatchConfig, WatchId};

const ITEM_COUNT: u64 = 40;
const ITEM_HEIGHT: f32 = 150.0;
const VIEWPORT: Size = Size::new(640.0, 800.0);

/// Document-style layout: item `i` sits at `i * ITEM_HEIGHT` in content
/// coordinates; rects are reported relative to the scrolled viewport.
struct FeedLayout {
    scroll_top: f32,
}

impl LayoutProbe for FeedLayout {
    fn element_rect(&self, id: WatchId) -> Option<Rect> {
        (id.0 < ITEM_COUNT).then(|| {
            Rect::new(
                id.0 as f32 * ITEM_HEIGHT - self.scroll_top,
                0.0,
                VIEWPORT.width,
                ITEM_HEIGHT,
            )
        })
    }

    fn is_hidden(&self, _id: WatchId) -> bool {
        false
    }

    fn viewport(&self) -> Size {
        VIEWPORT
    }

    fn scroll_parent(&self, _id: WatchId) -> Option<WatchId> {
        None
    }
}

/// Listener plumbing stand-in; a real host would subscribe to native events.
struct ConsoleHost;

impl ListenerHost for ConsoleHost {
    fn attach(&mut self, target: ScrollTarget, kind: EventKind, options: ListenerOptions) {
        log::info!("attach {kind:?} listener on {target:?} ({options:?})");
    }

    fn detach(&mut self, target: ScrollTarget, kind: EventKind) {
        log::info!("detach {kind:?} listener from {target:?}");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Lazyview Feed Simulation ===");
    println!(
        "{} items of {}px in an {}px viewport; items render once, 200px ahead of the fold.",
        ITEM_COUNT, ITEM_HEIGHT, VIEWPORT.height
    );
    println!();

    let mut viewer = LazyViewer::new(ConsoleHost);
    let mut layout = FeedLayout { scroll_top: 0.0 };
    let rendered = Rc::new(Cell::new(0u64));

    let config = WatchConfig::new()
        .with_offset(OffsetSpec::Edges(200.0, 0.0))
        .once();
    for i in 0..ITEM_COUNT {
        let id = WatchId(i);
        let rendered = Rc::clone(&rendered);
        viewer
            .register(&layout, id, config, move |visible| {
                if visible {
                    rendered.set(rendered.get() + 1);
                    log::info!("item {i} rendered");
                }
            })
            .expect("feed item config is valid");
    }
    println!(
        "after mount: {} rendered, {} still watched",
        rendered.get(),
        viewer.watched()
    );

    // Scroll through half the feed.
    let half = ITEM_COUNT as f32 * ITEM_HEIGHT / 2.0;
    while layout.scroll_top < half {
        layout.scroll_top += 400.0;
        viewer.on_scroll(&layout, Instant::now());
    }
    println!(
        "after scrolling to {}px: {} rendered, {} still watched",
        layout.scroll_top,
        rendered.get(),
        viewer.watched()
    );

    // Print view: everything must render regardless of geometry.
    viewer.force_visible();
    println!(
        "after force_visible: {} rendered, {} still watched",
        rendered.get(),
        viewer.watched()
    );
}
