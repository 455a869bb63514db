//! Ordered watch registry and the pending-removal buffer.
//!
//! Insertion order is the iteration order of a dispatch pass. An id appears
//! at most once; re-registering a live id replaces its config in place so
//! the element keeps its slot and its last computed state.

use rustc_hash::FxHashSet;

use crate::config::WatchConfig;
use crate::platform::ScrollTarget;
use crate::WatchId;

/// Render-trigger callback invoked with the new visibility state.
///
/// Callbacks receive no engine reference and must not re-enter it; they are
/// expected to flag the host's own render state (swap placeholder for
/// content, or back).
pub type RenderTrigger = Box<dyn FnMut(bool)>;

/// One watched element: identity, last computed state, config snapshot and
/// the scroll target resolved at registration.
pub struct WatchedElement {
    pub(crate) id: WatchId,
    pub(crate) visible: bool,
    pub(crate) config: WatchConfig,
    pub(crate) target: ScrollTarget,
    pub(crate) trigger: RenderTrigger,
}

impl WatchedElement {
    pub(crate) fn new(
        id: WatchId,
        config: WatchConfig,
        target: ScrollTarget,
        trigger: RenderTrigger,
    ) -> Self {
        Self {
            id,
            visible: false,
            config,
            target,
            trigger,
        }
    }

    #[inline]
    pub fn id(&self) -> WatchId {
        self.id
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }
}

/// Ordered collection of watched elements plus the buffer of `once`
/// elements awaiting removal at end of pass.
#[derive(Default)]
pub struct WatchRegistry {
    elements: Vec<WatchedElement>,
    pending: FxHashSet<WatchId>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: WatchId) -> Option<&WatchedElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub(crate) fn index_of(&self, id: WatchId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub(crate) fn element_at(&self, index: usize) -> &WatchedElement {
        &self.elements[index]
    }

    pub(crate) fn element_at_mut(&mut self, index: usize) -> &mut WatchedElement {
        &mut self.elements[index]
    }

    /// Inserts an element, or replaces the config/target/trigger of a live
    /// one in place. Returns the replaced element's target when the id was
    /// already registered, so the caller can release its old binding.
    pub(crate) fn register(&mut self, element: WatchedElement) -> Option<ScrollTarget> {
        if let Some(existing) = self.elements.iter_mut().find(|e| e.id == element.id) {
            log::debug!("watch {} re-registered, updating in place", element.id);
            let old_target = existing.target;
            existing.config = element.config;
            existing.target = element.target;
            existing.trigger = element.trigger;
            Some(old_target)
        } else {
            log::trace!("watch {} registered", element.id);
            self.elements.push(element);
            None
        }
    }

    /// Removes by identity. No-op when absent: unmount may race with the
    /// once-flush removal path.
    pub(crate) fn deregister(&mut self, id: WatchId) -> Option<WatchedElement> {
        self.pending.remove(&id);
        let index = self.elements.iter().position(|e| e.id == id)?;
        log::trace!("watch {id} deregistered");
        Some(self.elements.remove(index))
    }

    /// Buffers a `once` element for removal after the current pass.
    pub(crate) fn enqueue_pending(&mut self, id: WatchId) {
        self.pending.insert(id);
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Removes every buffered element from the registry and clears the
    /// buffer. Runs after every full dispatch pass.
    pub(crate) fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        log::debug!("flushing {} satisfied watch(es)", self.pending.len());
        let pending = &self.pending;
        self.elements.retain(|e| !pending.contains(&e.id));
        self.pending.clear();
    }
}
