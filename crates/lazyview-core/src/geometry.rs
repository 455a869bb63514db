//! Geometric primitives and the two visibility tests.
//!
//! Visibility is decided against either the document viewport or the
//! intersection of an overflow container with the viewport. Both tests are
//! pure functions over rectangles; callers substitute [`Rect::ZERO`] for any
//! box they failed to measure.

/// Axis-aligned bounding box in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        top: 0.0,
        left: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// Viewport dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Visibility margin expanding (positive) or shrinking (negative) the
/// effective boundary before/after an element's natural edges.
///
/// A uniform value is broadcast to both edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffsetSpec {
    Uniform(f32),
    Edges(f32, f32),
}

impl OffsetSpec {
    /// Resolves to a `(before, after)` pair.
    #[inline]
    pub fn resolve(&self) -> (f32, f32) {
        match *self {
            OffsetSpec::Uniform(v) => (v, v),
            OffsetSpec::Edges(before, after) => (before, after),
        }
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        let (before, after) = self.resolve();
        before.is_finite() && after.is_finite()
    }
}

impl Default for OffsetSpec {
    fn default() -> Self {
        OffsetSpec::Uniform(0.0)
    }
}

/// Document-relative visibility test.
///
/// `hidden` marks an element with no layout at all (zero extents, no client
/// rects); such elements are invisible regardless of geometry.
pub fn document_visible(elem: Rect, hidden: bool, viewport: Size, offset: OffsetSpec) -> bool {
    if hidden {
        return false;
    }
    let (before, after) = offset.resolve();
    elem.top - before <= viewport.height && elem.top + elem.height + after >= 0.0
}

/// Container-relative visibility test.
///
/// The element is checked against the intersection of its scroll container
/// with the viewport, on both axes.
pub fn container_visible(elem: Rect, parent: Rect, viewport: Size, offset: OffsetSpec) -> bool {
    let (before, after) = offset.resolve();

    let inter_top = parent.top.max(0.0);
    let inter_left = parent.left.max(0.0);
    let inter_height = viewport.height.min(parent.bottom()) - inter_top;
    let inter_width = viewport.width.min(parent.right()) - inter_left;

    let offset_top = elem.top - inter_top;
    let offset_left = elem.left - inter_left;

    offset_top - before <= inter_height
        && offset_top + elem.height + after >= 0.0
        && offset_left - before <= inter_width
        && offset_left + elem.width + after >= 0.0
}
