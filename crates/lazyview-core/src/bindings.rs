//! Reference-counted listener bookkeeping.
//!
//! One native listener per `(target, event)` pair, attached on the first
//! hold and detached on the last. Counts live in an owned table keyed by
//! the pair, not on the container objects themselves. Overflow elements
//! each hold their container's scroll listener; the root scroll/resize
//! listeners are held once by the engine while the watch set is non-empty.
//! The table is what keeps those two lifecycles from double-attaching when
//! they land on the same container.

use rustc_hash::FxHashMap;

use crate::platform::{EventKind, ScrollTarget};

/// Listener identity: which source, which event stream.
pub type BindKey = (ScrollTarget, EventKind);

#[derive(Default)]
pub struct ListenerBindings {
    counts: FxHashMap<BindKey, u32>,
}

impl ListenerBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the pair's count. Returns `true` on the 0→1 transition,
    /// when the caller must attach the native listener.
    pub fn acquire(&mut self, target: ScrollTarget, kind: EventKind) -> bool {
        let count = self.counts.entry((target, kind)).or_insert(0);
        *count += 1;
        log::trace!("binding {target:?}/{kind:?} count -> {count}");
        *count == 1
    }

    /// Decrements the pair's count. Returns `true` on the 1→0 transition,
    /// when the caller must detach the native listener; the entry is
    /// dropped.
    ///
    /// A release without a matching acquire is a lifecycle bug upstream;
    /// it is logged and clamped so the dispatch path stays alive.
    pub fn release(&mut self, target: ScrollTarget, kind: EventKind) -> bool {
        match self.counts.get_mut(&(target, kind)) {
            Some(count) if *count > 1 => {
                *count -= 1;
                log::trace!("binding {target:?}/{kind:?} count -> {count}");
                false
            }
            Some(_) => {
                self.counts.remove(&(target, kind));
                log::trace!("binding {target:?}/{kind:?} count -> 0, detaching");
                true
            }
            None => {
                log::warn!("binding underflow for {target:?}/{kind:?}: release without acquire");
                false
            }
        }
    }

    pub fn count(&self, target: ScrollTarget, kind: EventKind) -> u32 {
        self.counts.get(&(target, kind)).copied().unwrap_or(0)
    }

    /// Pairs with a live listener, for rebinding after a handler rebuild.
    pub fn bound(&self) -> impl Iterator<Item = BindKey> + '_ {
        self.counts.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
