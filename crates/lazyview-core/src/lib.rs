//! Headless lazy-render visibility engine.
//!
//! Defers rendering of off-screen elements until they approach the visible
//! viewport. The crate decides *when* a render should be allowed to
//! proceed; the host UI layer performs the actual placeholder/content swap.
//!
//! The engine is UI-agnostic. A host is expected to provide, through the
//! [`platform`] traits:
//! - element bounding boxes and the viewport size
//! - native scroll/resize event subscription
//! - stable [`WatchId`] handles for its nodes
//!
//! and to forward events into [`LazyViewer`], which owns the watch
//! registry, per-element visibility state, rate limiting and container
//! listener bookkeeping.

pub mod bindings;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod platform;
pub mod rate_limit;
pub mod registry;

mod resolver;

pub use config::{ConfigError, WatchConfig};
pub use engine::LazyViewer;
pub use geometry::{OffsetSpec, Rect, Size};
pub use platform::{EventKind, LayoutProbe, ListenerHost, ListenerOptions, ScrollTarget};
pub use rate_limit::{RateLimitMode, RateLimiter};
pub use registry::RenderTrigger;

/// Stable handle to a host UI node.
///
/// Allocated by the host; the engine never interprets the value beyond
/// identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
