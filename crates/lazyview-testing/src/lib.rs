//! Testing utilities and harness for Lazyview.
//!
//! Provides a scripted layout probe, a recording listener host and a render
//! callback log, so engine scenarios can be driven without a real UI layer.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use lazyview_core::platform::{EventKind, ListenerHost, ListenerOptions, ScrollTarget};
use lazyview_core::{LayoutProbe, Rect, Size, WatchId};

/// Scripted layout probe.
///
/// Rects are in viewport coordinates; an id without a rect reads as a
/// failed measurement (the engine substitutes the zero box).
pub struct MockLayout {
    viewport: Size,
    rects: FxHashMap<WatchId, Rect>,
    hidden: FxHashSet<WatchId>,
    parents: FxHashMap<WatchId, WatchId>,
}

impl MockLayout {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            rects: FxHashMap::default(),
            hidden: FxHashSet::default(),
            parents: FxHashMap::default(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_rect(&mut self, id: WatchId, rect: Rect) {
        self.rects.insert(id, rect);
    }

    /// Simulates a detached node: subsequent reads fail.
    pub fn clear_rect(&mut self, id: WatchId) {
        self.rects.remove(&id);
    }

    pub fn set_hidden(&mut self, id: WatchId, hidden: bool) {
        if hidden {
            self.hidden.insert(id);
        } else {
            self.hidden.remove(&id);
        }
    }

    pub fn set_parent(&mut self, id: WatchId, parent: WatchId) {
        self.parents.insert(id, parent);
    }

    /// Scrolls the whole document down by `dy`: every known rect moves up.
    pub fn scroll_by(&mut self, dy: f32) {
        for rect in self.rects.values_mut() {
            rect.top -= dy;
        }
    }
}

impl LayoutProbe for MockLayout {
    fn element_rect(&self, id: WatchId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    fn is_hidden(&self, id: WatchId) -> bool {
        self.hidden.contains(&id)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_parent(&self, id: WatchId) -> Option<WatchId> {
        self.parents.get(&id).copied()
    }
}

/// Listener event captured by [`RecordingHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Attach {
        target: ScrollTarget,
        kind: EventKind,
        options: ListenerOptions,
    },
    Detach {
        target: ScrollTarget,
        kind: EventKind,
    },
}

/// Listener host that records every attach/detach and enforces the
/// at-most-one-listener-per-pair contract.
#[derive(Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
    attached: FxHashSet<(ScrollTarget, EventKind)>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self, target: ScrollTarget, kind: EventKind) -> bool {
        self.attached.contains(&(target, kind))
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }
}

impl ListenerHost for RecordingHost {
    fn attach(&mut self, target: ScrollTarget, kind: EventKind, options: ListenerOptions) {
        assert!(
            self.attached.insert((target, kind)),
            "duplicate attach for {target:?}/{kind:?}"
        );
        self.events.push(HostEvent::Attach {
            target,
            kind,
            options,
        });
    }

    fn detach(&mut self, target: ScrollTarget, kind: EventKind) {
        assert!(
            self.attached.remove(&(target, kind)),
            "detach without attach for {target:?}/{kind:?}"
        );
        self.events.push(HostEvent::Detach { target, kind });
    }
}

/// Shared log of render-trigger invocations.
///
/// Clone it freely; all clones record into the same buffer.
#[derive(Clone, Default)]
pub struct VisibilityLog {
    events: Rc<RefCell<Vec<(WatchId, bool)>>>,
}

impl VisibilityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the render trigger for one watched id.
    pub fn recorder(&self, id: WatchId) -> impl FnMut(bool) + 'static {
        let events = Rc::clone(&self.events);
        move |visible| events.borrow_mut().push((id, visible))
    }

    pub fn events(&self) -> Vec<(WatchId, bool)> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Number of triggers recorded for an id.
    pub fn count_for(&self, id: WatchId) -> usize {
        self.events.borrow().iter().filter(|(e, _)| *e == id).count()
    }

    pub fn last_for(&self, id: WatchId) -> Option<bool> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|(e, _)| *e == id)
            .map(|&(_, visible)| visible)
    }
}
