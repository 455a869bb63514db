//! The watch context: registration lifecycle, dispatch coordination and
//! listener management.
//!
//! [`LazyViewer`] is the explicit process-wide context object. It is built
//! lazily in the sense that no listener exists before the first registration
//! and everything is torn down when the watch set empties; the host decides
//! where the context lives (typically one per window or app shell).
//!
//! Event flow: the host forwards native scroll/resize events to
//! [`on_scroll`](LazyViewer::on_scroll) / [`on_resize`](LazyViewer::on_resize)
//! and drives deferred rate-limit deadlines through
//! [`poll`](LazyViewer::poll), scheduling its wakeup from
//! [`next_deadline`](LazyViewer::next_deadline).

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use web_time::Instant;

use crate::bindings::{BindKey, ListenerBindings};
use crate::config::{ConfigError, WatchConfig};
use crate::platform::{EventKind, LayoutProbe, ListenerHost, ListenerOptions, ScrollTarget};
use crate::rate_limit::{limiter_for, RateLimitMode, RateLimiter};
use crate::registry::{WatchRegistry, WatchedElement};
use crate::resolver;
use crate::WatchId;

/// Process-wide lazy-render context.
///
/// All mutation happens synchronously inside registration hooks and event
/// handler invocations; dispatch passes are non-preemptible and never
/// overlap. The context owns per-element render callbacks and is therefore
/// not sendable across threads.
pub struct LazyViewer<H: ListenerHost> {
    host: H,
    registry: WatchRegistry,
    bindings: ListenerBindings,
    /// Container scroll listener held per live overflow element. Survives
    /// the once-flush: the hold is released on unmount, not on removal from
    /// the watch set.
    container_tickets: FxHashMap<WatchId, ScrollTarget>,
    /// Listener holds taken at the empty→non-empty transition.
    root_holds: SmallVec<[BindKey; 2]>,
    gate: Box<dyn RateLimiter>,
}

impl<H: ListenerHost> LazyViewer<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            registry: WatchRegistry::new(),
            bindings: ListenerBindings::new(),
            container_tickets: FxHashMap::default(),
            root_holds: SmallVec::new(),
            gate: limiter_for(RateLimitMode::Immediate),
        }
    }

    /// Mount hook: validates the config, resolves the scroll target, binds
    /// listeners and runs an immediate visibility check for the element.
    ///
    /// Re-registering a live id is treated as a config update: the element
    /// keeps its slot and visible state, its bindings are re-resolved.
    pub fn register(
        &mut self,
        probe: &dyn LayoutProbe,
        id: WatchId,
        config: WatchConfig,
        trigger: impl FnMut(bool) + 'static,
    ) -> Result<(), ConfigError> {
        config.validate()?;

        let was_empty = self.registry.is_empty();
        let target = self.resolve_target(probe, id, &config);

        // Shared handler: built on first mount, rebuilt (and listeners
        // rebound) when the mounting element's mode differs.
        self.rebuild_gate(RateLimitMode::from_config(&config));

        self.registry
            .register(WatchedElement::new(id, config, target, Box::new(trigger)));
        self.sync_container_binding(id, &config, target);

        if was_empty {
            self.attach_root_listeners(&config);
        }

        // Elements already in view must render without waiting for the
        // first scroll event.
        if let Some(index) = self.registry.index_of(id) {
            self.check_element(probe, index);
            self.registry.flush_pending();
            self.maybe_teardown();
        }
        Ok(())
    }

    /// Unmount hook: releases the element's container listener and removes
    /// it from the watch set. No-op for unknown ids (unmount may follow a
    /// once-flush). Returns whether anything was released.
    pub fn deregister(&mut self, id: WatchId) -> bool {
        let had_binding = self.release_container_binding(id);
        let removed = self.registry.deregister(id).is_some();
        if removed {
            self.maybe_teardown();
        }
        removed || had_binding
    }

    /// One unthrottled, undebounced dispatch pass. For layout changes that
    /// fire no native scroll/resize event.
    pub fn force_check(&mut self, probe: &dyn LayoutProbe) {
        self.dispatch(probe);
    }

    /// Bypasses geometry entirely: marks every registered element visible,
    /// triggers render for all and flushes satisfied `once` watches. For
    /// contexts where lazy evaluation must be disabled (print view,
    /// automated tests).
    pub fn force_visible(&mut self) {
        log::debug!("force_visible over {} watch(es)", self.registry.len());
        for index in 0..self.registry.len() {
            let element = self.registry.element_at_mut(index);
            element.visible = true;
            let id = element.id;
            let once = element.config.once;
            (element.trigger)(true);
            if once {
                self.registry.enqueue_pending(id);
            }
        }
        self.registry.flush_pending();
        self.maybe_teardown();
    }

    /// Shared scroll handler, rate-limited by the active gate.
    pub fn on_scroll(&mut self, probe: &dyn LayoutProbe, now: Instant) {
        if self.registry.is_empty() {
            return;
        }
        if self.gate.on_event(now) {
            self.dispatch(probe);
        }
    }

    /// Shared resize handler, rate-limited by the active gate.
    pub fn on_resize(&mut self, probe: &dyn LayoutProbe, now: Instant) {
        if self.registry.is_empty() {
            return;
        }
        if self.gate.on_event(now) {
            self.dispatch(probe);
        }
    }

    /// Fires a deferred dispatch whose deadline has passed. Returns whether
    /// a pass ran.
    pub fn poll(&mut self, probe: &dyn LayoutProbe, now: Instant) -> bool {
        if self.gate.poll(now) {
            self.dispatch(probe);
            true
        } else {
            false
        }
    }

    /// Next instant at which [`poll`](Self::poll) has work to do, for
    /// `WaitUntil`-style host scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gate.deadline()
    }

    /// Last computed visibility for a watched id.
    pub fn is_visible(&self, id: WatchId) -> Option<bool> {
        self.registry.get(id).map(|e| e.visible())
    }

    pub fn watched(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// One full evaluation of all registered elements, in insertion order,
    /// followed by the pending-removal flush. Never panics: geometry
    /// failures degrade to the zero box inside the resolver.
    fn dispatch(&mut self, probe: &dyn LayoutProbe) {
        let len = self.registry.len();
        log::trace!("dispatch pass over {len} watch(es)");
        for index in 0..len {
            self.check_element(probe, index);
        }
        self.registry.flush_pending();
        self.maybe_teardown();
    }

    fn check_element(&mut self, probe: &dyn LayoutProbe, index: usize) {
        let measured = resolver::evaluate(probe, self.registry.element_at(index));
        let element = self.registry.element_at_mut(index);
        let resolution = resolver::decide(
            element.visible,
            measured,
            element.config.once,
            element.config.unmount_if_invisible,
        );
        element.visible = resolution.new_visible;
        let id = element.id;
        if resolution.render {
            (element.trigger)(resolution.new_visible);
        }
        if resolution.enqueue_removal {
            self.registry.enqueue_pending(id);
        }
    }

    /// Scroll target selection, done once per registration.
    ///
    /// An overflow element binds to its nearest scrollable ancestor (or an
    /// explicit override); if that resolves to the document root the
    /// document-relative test applies after all.
    fn resolve_target(
        &self,
        probe: &dyn LayoutProbe,
        id: WatchId,
        config: &WatchConfig,
    ) -> ScrollTarget {
        if !config.overflow {
            return ScrollTarget::Window;
        }
        match config.scroll_container.or_else(|| probe.scroll_parent(id)) {
            Some(parent) => ScrollTarget::Container(parent),
            None => ScrollTarget::Window,
        }
    }

    fn rebuild_gate(&mut self, mode: RateLimitMode) {
        if self.gate.mode() == mode {
            return;
        }
        log::debug!("rate-limit mode changed to {mode:?}, rebuilding shared handler");
        self.gate = limiter_for(mode);
        self.rebind_listeners();
    }

    /// Takes one hold on a listener pair, attaching the native listener on
    /// the first hold.
    fn acquire_listener(&mut self, target: ScrollTarget, kind: EventKind) {
        if self.bindings.acquire(target, kind) {
            self.host.attach(target, kind, ListenerOptions::PASSIVE);
        }
    }

    /// Drops one hold, detaching the native listener with the last.
    fn release_listener(&mut self, target: ScrollTarget, kind: EventKind) {
        if self.bindings.release(target, kind) {
            self.host.detach(target, kind);
        }
    }

    /// Detach/attach cycle for every live listener after a handler rebuild.
    fn rebind_listeners(&mut self) {
        let bound: SmallVec<[BindKey; 4]> = self.bindings.bound().collect();
        for (target, kind) in bound {
            self.host.detach(target, kind);
            self.host.attach(target, kind, ListenerOptions::PASSIVE);
        }
    }

    /// Reconciles the container scroll hold an element has with what its
    /// current config wants.
    fn sync_container_binding(&mut self, id: WatchId, config: &WatchConfig, target: ScrollTarget) {
        let desired = match target {
            ScrollTarget::Container(_) if config.overflow && config.scroll => Some(target),
            _ => None,
        };
        let current = self.container_tickets.get(&id).copied();
        if current == desired {
            return;
        }
        if current.is_some() {
            self.release_container_binding(id);
        }
        if let Some(container) = desired {
            self.acquire_listener(container, EventKind::Scroll);
            self.container_tickets.insert(id, container);
        }
    }

    fn release_container_binding(&mut self, id: WatchId) -> bool {
        match self.container_tickets.remove(&id) {
            Some(container) => {
                self.release_listener(container, EventKind::Scroll);
                true
            }
            None => false,
        }
    }

    /// Root listener holds are taken once, on the empty→non-empty
    /// transition, gated by the mounting element's scroll/resize flags.
    /// Overflow elements carry their own scroll listener, so only resize
    /// applies to them here.
    fn attach_root_listeners(&mut self, config: &WatchConfig) {
        if config.scroll && !config.overflow {
            let source = config
                .scroll_container
                .map(ScrollTarget::Container)
                .unwrap_or(ScrollTarget::Window);
            self.acquire_listener(source, EventKind::Scroll);
            self.root_holds.push((source, EventKind::Scroll));
        }
        if config.resize {
            self.acquire_listener(ScrollTarget::Window, EventKind::Resize);
            self.root_holds.push((ScrollTarget::Window, EventKind::Resize));
        }
    }

    /// When the watch set empties, the root holds come down and the shared
    /// handler is dropped; the next mount rebuilds both.
    fn maybe_teardown(&mut self) {
        if !self.registry.is_empty() {
            return;
        }
        if !self.root_holds.is_empty() {
            log::debug!("watch set empty, detaching root listeners");
            let holds = std::mem::take(&mut self.root_holds);
            for (target, kind) in holds {
                self.release_listener(target, kind);
            }
        }
        if self.gate.mode() != RateLimitMode::Immediate {
            self.gate = limiter_for(RateLimitMode::Immediate);
        }
    }
}
