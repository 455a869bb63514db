//! Per-element visibility resolution.
//!
//! Two steps: measure the element against its scroll target, then run the
//! prior-state decision table. Measurement substitutes the zero box for any
//! rect the probe cannot supply.

use crate::geometry::{self, Rect};
use crate::platform::{LayoutProbe, ScrollTarget};
use crate::registry::WatchedElement;

/// Outcome of one resolution: the state to store and the side effects to
/// perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub new_visible: bool,
    pub render: bool,
    pub enqueue_removal: bool,
}

impl Resolution {
    const fn keep(visible: bool) -> Self {
        Self {
            new_visible: visible,
            render: false,
            enqueue_removal: false,
        }
    }
}

/// Measures geometric visibility for an element.
pub(crate) fn evaluate(probe: &dyn LayoutProbe, element: &WatchedElement) -> bool {
    let rect = probe.element_rect(element.id).unwrap_or(Rect::ZERO);
    let viewport = probe.viewport();
    match element.target {
        ScrollTarget::Window => {
            let hidden = probe.is_hidden(element.id);
            geometry::document_visible(rect, hidden, viewport, element.config.offset)
        }
        ScrollTarget::Container(parent) => {
            let parent_rect = probe.element_rect(parent).unwrap_or(Rect::ZERO);
            geometry::container_visible(rect, parent_rect, viewport, element.config.offset)
        }
    }
}

/// The decision table.
///
/// A `once` element never reverts: once visible means rendered exactly one
/// time, permanently, even if scrolled back out.
pub(crate) fn decide(
    prior: bool,
    measured: bool,
    once: bool,
    unmount_if_invisible: bool,
) -> Resolution {
    match (prior, measured) {
        (false, true) => Resolution {
            new_visible: true,
            render: true,
            enqueue_removal: once,
        },
        (true, false) if !once => Resolution {
            new_visible: false,
            render: unmount_if_invisible,
            enqueue_removal: false,
        },
        // (true, true), (false, false), and once-element re-hiding.
        (prior, _) => Resolution::keep(prior),
    }
}
