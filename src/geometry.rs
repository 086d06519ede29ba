//! Viewport-aware rectangle clamping for the preview window.
//!
//! All functions here are pure. Size is clamped before position, and the
//! position clamp always uses the already-clamped size, which makes
//! [`fit_rect`] idempotent.
//!
//! # Examples
//!
//! ```
//! use pdfstage::geometry::{Point, Size, Viewport, WindowConstraints, fit_rect};
//!
//! let constraints = WindowConstraints::default();
//! let geometry = fit_rect(
//!     Point::new(-50.0, 900.0),
//!     Size::new(2000.0, 100.0),
//!     Viewport::new(1280.0, 800.0),
//!     &constraints,
//! );
//! assert!(geometry.fits_within(Viewport::new(1280.0, 800.0), &constraints));
//! ```

use serde::{Deserialize, Serialize};

/// Slack for far-edge comparisons; `(v - w - pad) + w` may round by an ulp.
const EPSILON: f64 = 1e-6;

/// A point in viewport pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the viewport's left edge.
    pub x: f64,
    /// Vertical offset from the viewport's top edge.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`.
    pub fn offset_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// A width/height pair in viewport pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Create a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Dimensions of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Fixed limits the window geometry is clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConstraints {
    /// Smallest allowed window width.
    pub min_width: f64,
    /// Smallest allowed window height.
    pub min_height: f64,
    /// Gap kept between the window and every viewport edge. Shrinks on a
    /// viewport axis shorter than two paddings.
    pub edge_padding: f64,
    /// Height of the header strip that starts a drag.
    pub header_height: f64,
}

impl Default for WindowConstraints {
    fn default() -> Self {
        Self {
            min_width: 260.0,
            min_height: 200.0,
            edge_padding: 8.0,
            header_height: 40.0,
        }
    }
}

impl WindowConstraints {
    /// Padding kept along a viewport axis of length `extent`.
    pub fn inset(&self, extent: f64) -> f64 {
        self.edge_padding.min(extent / 2.0).max(0.0)
    }

    /// Largest width the window may take in `viewport`.
    pub fn max_width(&self, viewport: Viewport) -> f64 {
        (viewport.width - self.inset(viewport.width) * 2.0).max(0.0)
    }

    /// Largest height the window may take in `viewport`.
    pub fn max_height(&self, viewport: Viewport) -> f64 {
        (viewport.height - self.inset(viewport.height) * 2.0).max(0.0)
    }
}

/// Position and size of the floating window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Top-left corner.
    pub position: Point,
    /// Outer size.
    pub size: Size,
}

impl WindowGeometry {
    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    /// Whether `point` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.right()
            && point.y >= self.position.y
            && point.y <= self.bottom()
    }

    /// Whether this geometry satisfies every bound for `viewport`.
    ///
    /// Minimum sizes are relaxed to the usable viewport extent when the
    /// viewport is too small to hold them.
    pub fn fits_within(&self, viewport: Viewport, constraints: &WindowConstraints) -> bool {
        let inset_x = constraints.inset(viewport.width);
        let inset_y = constraints.inset(viewport.height);
        let max_w = constraints.max_width(viewport);
        let max_h = constraints.max_height(viewport);
        let min_w = constraints.min_width.min(max_w);
        let min_h = constraints.min_height.min(max_h);

        self.size.width >= min_w
            && self.size.width <= max_w
            && self.size.height >= min_h
            && self.size.height <= max_h
            && self.position.x >= inset_x
            && self.position.y >= inset_y
            && self.right() <= viewport.width - inset_x + EPSILON
            && self.bottom() <= viewport.height - inset_y + EPSILON
    }
}

/// Bound `value` to `[min, max]`.
///
/// Never panics: when `min > max` the lower bound wins, so callers that need
/// the upper bound to dominate must order their arguments accordingly.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Clamp a size to `[min, usable]` on each axis.
///
/// If the viewport is too small to hold the minimum, the usable extent wins
/// so the window stays fully visible.
pub fn fit_size(desired: Size, viewport: Viewport, constraints: &WindowConstraints) -> Size {
    let max_w = constraints.max_width(viewport);
    let max_h = constraints.max_height(viewport);

    Size::new(
        clamp(desired.width, constraints.min_width.min(max_w), max_w),
        clamp(desired.height, constraints.min_height.min(max_h), max_h),
    )
}

/// Clamp a position so a rectangle of `size` stays inside the padded viewport.
pub fn fit_position(
    desired: Point,
    size: Size,
    viewport: Viewport,
    constraints: &WindowConstraints,
) -> Point {
    let inset_x = constraints.inset(viewport.width);
    let inset_y = constraints.inset(viewport.height);

    Point::new(
        clamp(desired.x, inset_x, viewport.width - size.width - inset_x),
        clamp(desired.y, inset_y, viewport.height - size.height - inset_y),
    )
}

/// Constrain a desired rectangle to the viewport, size first.
pub fn fit_rect(
    desired_position: Point,
    desired_size: Size,
    viewport: Viewport,
    constraints: &WindowConstraints,
) -> WindowGeometry {
    let size = fit_size(desired_size, viewport, constraints);
    let position = fit_position(desired_position, size, viewport, constraints);
    WindowGeometry { position, size }
}

/// Re-fit an existing geometry, e.g. after the viewport changed.
pub fn refit(
    geometry: WindowGeometry,
    viewport: Viewport,
    constraints: &WindowConstraints,
) -> WindowGeometry {
    fit_rect(geometry.position, geometry.size, viewport, constraints)
}
