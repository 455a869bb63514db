//! Host boundary traits.
//!
//! The engine is headless: the UI layer supplies geometry reads and native
//! event subscriptions through these traits and receives render triggers
//! through per-element callbacks. Implementations decide what a [`WatchId`]
//! actually points at (a DOM node, a layout-tree node, a scripted fixture).

use crate::geometry::{Rect, Size};
use crate::WatchId;

/// Read-only geometry access for watched elements.
///
/// Every method is allowed to fail softly: a `None` rect stands in for a
/// detached or unmeasured node and the engine substitutes the zero box.
pub trait LayoutProbe {
    /// Bounding box of the element in viewport coordinates.
    fn element_rect(&self, id: WatchId) -> Option<Rect>;

    /// Whether the element currently has no layout at all (zero extents and
    /// no client rects). Distinct from being scrolled out of view.
    fn is_hidden(&self, id: WatchId) -> bool;

    /// Viewport dimensions. Hosts fall back to the document root's client
    /// dimensions when the window size is unavailable.
    fn viewport(&self) -> Size;

    /// Nearest scrollable ancestor of the element, or `None` when the
    /// document root is the scroll ancestor.
    fn scroll_parent(&self, id: WatchId) -> Option<WatchId>;
}

/// Scroll source an element is tested against and listened on.
///
/// Selected once at registration; never re-derived during dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    /// The window / document root.
    Window,
    /// An overflow container identified by its own watch handle.
    Container(WatchId),
}

/// Event stream a listener is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
}

/// Subscription options forwarded to the native event source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Non-capturing passive listener; hosts without passive support degrade
    /// to a plain non-capturing subscription.
    pub const PASSIVE: ListenerOptions = ListenerOptions {
        capture: false,
        passive: true,
    };
}

/// Native listener management supplied by the host.
///
/// The engine reference-counts its subscriptions; hosts see at most one
/// attach per `(target, kind)` pair at a time.
pub trait ListenerHost {
    fn attach(&mut self, target: ScrollTarget, kind: EventKind, options: ListenerOptions);
    fn detach(&mut self, target: ScrollTarget, kind: EventKind);
}
