//! Visibility semantics end to end: registration, dispatch, once, forced
//! passes and rate-limited event flow.

use lazyview_testing::{MockLayout, RecordingHost, VisibilityLog};
use web_time::{Duration, Instant};

use lazyview_core::{LazyViewer, OffsetSpec, Rect, Size, WatchConfig, WatchId};

const VIEWPORT: Size = Size::new(1024.0, 800.0);

fn setup() -> (LazyViewer<RecordingHost>, MockLayout, VisibilityLog) {
    (
        LazyViewer::new(RecordingHost::new()),
        MockLayout::new(VIEWPORT),
        VisibilityLog::new(),
    )
}

#[test]
fn test_document_scroll_end_to_end() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(900.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::default(), log.recorder(id))
        .unwrap();

    // 900 > 800: below the viewport, no render yet.
    assert_eq!(viewer.is_visible(id), Some(false));
    assert_eq!(log.count_for(id), 0);

    layout.scroll_by(150.0);
    viewer.on_scroll(&layout, Instant::now());

    assert_eq!(viewer.is_visible(id), Some(true));
    assert_eq!(log.events(), vec![(id, true)]);

    // Still visible: no redundant render.
    viewer.on_scroll(&layout, Instant::now());
    assert_eq!(log.count_for(id), 1);
}

#[test]
fn test_offset_expands_visibility_boundary() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    // 850 - 100 = 750 <= 800: visible through the before-offset.
    layout.set_rect(id, Rect::new(850.0, 0.0, 100.0, 50.0));

    viewer
        .register(
            &layout,
            id,
            WatchConfig::new().with_offset(OffsetSpec::Edges(100.0, 0.0)),
            log.recorder(id),
        )
        .unwrap();

    assert_eq!(viewer.is_visible(id), Some(true));
    assert_eq!(log.events(), vec![(id, true)]);
}

#[test]
fn test_already_visible_element_renders_at_registration() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(100.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::default(), log.recorder(id))
        .unwrap();

    assert_eq!(log.events(), vec![(id, true)]);
}

#[test]
fn test_once_element_leaves_watch_set_and_never_reverts() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(900.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::new().once(), log.recorder(id))
        .unwrap();
    assert_eq!(viewer.watched(), 1);

    layout.scroll_by(200.0);
    viewer.on_scroll(&layout, Instant::now());

    // Rendered once and flushed within the same pass.
    assert_eq!(log.events(), vec![(id, true)]);
    assert_eq!(viewer.watched(), 0);
    assert_eq!(viewer.is_visible(id), None);

    // Scrolling it back out triggers nothing further.
    layout.scroll_by(-600.0);
    viewer.on_scroll(&layout, Instant::now());
    assert_eq!(log.count_for(id), 1);
}

#[test]
fn test_once_element_visible_at_mount_is_flushed_immediately() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(100.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::new().once(), log.recorder(id))
        .unwrap();

    assert_eq!(log.events(), vec![(id, true)]);
    assert_eq!(viewer.watched(), 0);
}

#[test]
fn test_unmount_if_invisible_reverts_with_render() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(400.0, 0.0, 100.0, 50.0));

    viewer
        .register(
            &layout,
            id,
            WatchConfig::new().unmount_if_invisible(),
            log.recorder(id),
        )
        .unwrap();
    assert_eq!(log.events(), vec![(id, true)]);

    // Scrolled far out: reverts and renders the unmount.
    layout.scroll_by(2000.0);
    viewer.on_scroll(&layout, Instant::now());
    assert_eq!(viewer.is_visible(id), Some(false));
    assert_eq!(log.events(), vec![(id, true), (id, false)]);
}

#[test]
fn test_revert_without_unmount_flag_is_silent() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(400.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::default(), log.recorder(id))
        .unwrap();

    layout.scroll_by(2000.0);
    viewer.on_scroll(&layout, Instant::now());

    // State flips back, but no render is triggered.
    assert_eq!(viewer.is_visible(id), Some(false));
    assert_eq!(log.events(), vec![(id, true)]);
}

#[test]
fn test_overflow_container_end_to_end() {
    let (mut viewer, mut layout, log) = setup();
    let parent = WatchId(100);
    let id = WatchId(1);
    layout.set_rect(parent, Rect::new(0.0, 0.0, 400.0, 400.0));
    layout.set_rect(id, Rect::new(450.0, 0.0, 100.0, 50.0));
    layout.set_parent(id, parent);

    viewer
        .register(&layout, id, WatchConfig::new().overflow(), log.recorder(id))
        .unwrap();

    // Intersection height is min(800, 400) = 400; offset 450 is past it.
    assert_eq!(viewer.is_visible(id), Some(false));

    // Parent scrolls its content up by 100.
    layout.set_rect(id, Rect::new(350.0, 0.0, 100.0, 50.0));
    viewer.on_scroll(&layout, Instant::now());

    assert_eq!(viewer.is_visible(id), Some(true));
    assert_eq!(log.events(), vec![(id, true)]);
}

#[test]
fn test_overflow_without_scroll_parent_uses_document_test() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    // No parent scripted: the ancestor resolves to the document root.
    layout.set_rect(id, Rect::new(750.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::new().overflow(), log.recorder(id))
        .unwrap();

    assert_eq!(viewer.is_visible(id), Some(true));
}

#[test]
fn test_hidden_element_is_forced_invisible() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(100.0, 0.0, 0.0, 0.0));
    layout.set_hidden(id, true);

    viewer
        .register(&layout, id, WatchConfig::default(), log.recorder(id))
        .unwrap();

    assert_eq!(viewer.is_visible(id), Some(false));
    assert_eq!(log.count_for(id), 0);

    // Becomes displayed again: next pass picks it up.
    layout.set_hidden(id, false);
    layout.set_rect(id, Rect::new(100.0, 0.0, 100.0, 50.0));
    viewer.force_check(&layout);
    assert_eq!(viewer.is_visible(id), Some(true));
}

#[test]
fn test_unmeasured_element_degrades_to_zero_box() {
    let (mut viewer, layout, log) = setup();
    let id = WatchId(1);
    // No rect scripted at all: the zero box sits at the viewport origin.
    viewer
        .register(&layout, id, WatchConfig::default(), log.recorder(id))
        .unwrap();
    assert_eq!(viewer.is_visible(id), Some(true));
}

#[test]
fn test_force_visible_bypasses_geometry() {
    let (mut viewer, mut layout, log) = setup();
    let far = WatchId(1);
    let near = WatchId(2);
    let once = WatchId(3);
    layout.set_rect(far, Rect::new(5000.0, 0.0, 100.0, 50.0));
    layout.set_rect(near, Rect::new(100.0, 0.0, 100.0, 50.0));
    layout.set_rect(once, Rect::new(5000.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, far, WatchConfig::default(), log.recorder(far))
        .unwrap();
    viewer
        .register(&layout, near, WatchConfig::default(), log.recorder(near))
        .unwrap();
    viewer
        .register(&layout, once, WatchConfig::new().once(), log.recorder(once))
        .unwrap();
    log.clear();

    viewer.force_visible();

    assert_eq!(viewer.is_visible(far), Some(true));
    assert_eq!(viewer.is_visible(near), Some(true));
    // The once element is flushed from the registry.
    assert_eq!(viewer.is_visible(once), None);
    assert_eq!(viewer.watched(), 2);
    assert_eq!(log.last_for(far), Some(true));
    assert_eq!(log.last_for(once), Some(true));
}

#[test]
fn test_force_check_picks_up_silent_layout_change() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(900.0, 0.0, 100.0, 50.0));

    viewer
        .register(&layout, id, WatchConfig::default(), log.recorder(id))
        .unwrap();
    assert_eq!(viewer.is_visible(id), Some(false));

    // Layout moved the element without any native event.
    layout.set_rect(id, Rect::new(300.0, 0.0, 100.0, 50.0));
    viewer.force_check(&layout);
    assert_eq!(viewer.is_visible(id), Some(true));
}

#[test]
fn test_debounced_scroll_coalesces_into_one_pass() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(900.0, 0.0, 100.0, 50.0));
    let base = Instant::now();

    viewer
        .register(
            &layout,
            id,
            WatchConfig::new().with_debounce(Duration::from_millis(300)),
            log.recorder(id),
        )
        .unwrap();

    layout.scroll_by(200.0);
    for ms in [0u64, 50, 100] {
        viewer.on_scroll(&layout, base + Duration::from_millis(ms));
    }
    // Burst is still coalescing: nothing dispatched yet.
    assert_eq!(viewer.is_visible(id), Some(false));
    assert_eq!(
        viewer.next_deadline(),
        Some(base + Duration::from_millis(400))
    );

    assert!(!viewer.poll(&layout, base + Duration::from_millis(399)));
    assert!(viewer.poll(&layout, base + Duration::from_millis(400)));
    assert_eq!(viewer.is_visible(id), Some(true));
    assert_eq!(log.events(), vec![(id, true)]);
}

#[test]
fn test_throttled_scroll_fires_leading_and_trailing() {
    let (mut viewer, mut layout, log) = setup();
    let id = WatchId(1);
    layout.set_rect(id, Rect::new(900.0, 0.0, 100.0, 50.0));
    let base = Instant::now();

    viewer
        .register(
            &layout,
            id,
            WatchConfig::new().with_throttle(Duration::from_millis(300)),
            log.recorder(id),
        )
        .unwrap();

    // Leading fire: dispatch runs but the element is still out of view.
    viewer.on_scroll(&layout, base);
    assert_eq!(viewer.is_visible(id), Some(false));

    // Scrolled into view during the cooldown: deferred, not dropped.
    layout.scroll_by(200.0);
    viewer.on_scroll(&layout, base + Duration::from_millis(100));
    assert_eq!(viewer.is_visible(id), Some(false));

    assert!(viewer.poll(&layout, base + Duration::from_millis(300)));
    assert_eq!(viewer.is_visible(id), Some(true));
    assert_eq!(log.events(), vec![(id, true)]);
}

#[test]
fn test_conflicting_rate_limit_rejected_without_side_effects() {
    let (mut viewer, layout, log) = setup();
    let id = WatchId(1);

    let result = viewer.register(
        &layout,
        id,
        WatchConfig::new()
            .with_throttle(Duration::from_millis(100))
            .with_debounce(Duration::from_millis(300)),
        log.recorder(id),
    );

    assert!(result.is_err());
    assert_eq!(viewer.watched(), 0);
    assert_eq!(viewer.host().attached_count(), 0);
}

#[test]
fn test_dispatch_order_is_insertion_order() {
    let (mut viewer, mut layout, log) = setup();
    for id in [3u64, 1, 2] {
        let id = WatchId(id);
        layout.set_rect(id, Rect::new(900.0, 0.0, 100.0, 50.0));
        viewer
            .register(&layout, id, WatchConfig::default(), log.recorder(id))
            .unwrap();
    }

    layout.scroll_by(200.0);
    viewer.on_scroll(&layout, Instant::now());

    let order: Vec<u64> = log.events().iter().map(|(id, _)| id.0).collect();
    assert_eq!(order, vec![3, 1, 2]);
}
