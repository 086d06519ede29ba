//! The floating preview window.
//!
//! A [`FloatingWindow`] hosts arbitrary content inside a chrome made of a
//! draggable header with a title and a close button, and a resize handle in
//! the bottom-right corner. Its geometry is kept fully inside the viewport at
//! all times: on creation, on every pointer move of a drag or resize, and on
//! every viewport change.
//!
//! Pointer input is delivered as `pointer_down` / `pointer_move` /
//! `pointer_up` calls in viewport coordinates. A press is routed by
//! [`FloatingWindow::hit_test`]; only one gesture runs at a time.

pub mod listeners;

pub use listeners::{GestureKind, ListenerGuard, ListenerRegistry, PointerListenerHost};

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, trace};

use crate::geometry::{
    Point, Size, Viewport, WindowConstraints, WindowGeometry, fit_position, fit_rect, fit_size,
    refit,
};

/// Side length of the square resize handle.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;
/// Gap between the resize handle and the window's bottom-right corner.
pub const RESIZE_HANDLE_INSET: f64 = 6.0;
/// Width of the close button at the right end of the header.
pub const CLOSE_BUTTON_WIDTH: f64 = 40.0;

/// Caller-supplied initial geometry, plus the compact-viewport rules applied
/// before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDefaults {
    /// Preferred left edge.
    pub x: f64,
    /// Preferred top edge.
    pub y: f64,
    /// Preferred width on roomy viewports.
    pub width: f64,
    /// Preferred height on roomy viewports.
    pub height: f64,
    /// Viewports at most this wide size the window by `compact_width_fraction`.
    pub compact_width_breakpoint: f64,
    /// Fraction of the viewport width used on compact viewports.
    pub compact_width_fraction: f64,
    /// Viewports at most this tall size the window by `compact_height_fraction`.
    pub compact_height_breakpoint: f64,
    /// Fraction of the viewport height used on compact viewports.
    pub compact_height_fraction: f64,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            x: 32.0,
            y: 32.0,
            width: 520.0,
            height: 360.0,
            compact_width_breakpoint: 640.0,
            compact_width_fraction: 0.92,
            compact_height_breakpoint: 800.0,
            compact_height_fraction: 0.80,
        }
    }
}

impl WindowDefaults {
    /// Size the window would like in `viewport`, before clamping.
    pub fn target_size(&self, viewport: Viewport) -> Size {
        let width = if viewport.width <= self.compact_width_breakpoint {
            (viewport.width * self.compact_width_fraction).floor()
        } else {
            self.width
        };
        let height = if viewport.height <= self.compact_height_breakpoint {
            (viewport.height * self.compact_height_fraction).floor()
        } else {
            self.height
        };
        Size::new(width, height)
    }

    /// Initial geometry for a window opened in `viewport`.
    pub fn initial_geometry(
        &self,
        viewport: Viewport,
        constraints: &WindowConstraints,
    ) -> WindowGeometry {
        fit_rect(
            Point::new(self.x, self.y),
            self.target_size(viewport),
            viewport,
            constraints,
        )
    }
}

/// Part of the window under a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitRegion {
    /// Header strip, outside the close button. Starts a drag.
    Header,
    /// Close button at the right end of the header.
    CloseButton,
    /// Corner resize handle. Starts a resize.
    ResizeHandle,
    /// Hosted content.
    Content,
    /// Not over the window.
    Outside,
}

/// What a pointer press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Nothing; the press was not for the window chrome.
    Ignored,
    /// A header drag began.
    DragStarted,
    /// A corner resize began.
    ResizeStarted,
    /// The close button was pressed and the window closed.
    Closed,
}

#[derive(Debug)]
enum Gesture {
    Idle,
    Dragging {
        pointer_offset: Point,
        _listeners: ListenerGuard,
    },
    Resizing {
        anchor_pointer: Point,
        anchor_size: Size,
        _listeners: ListenerGuard,
    },
}

/// A draggable, resizable window hosting `C`.
#[derive(Debug)]
pub struct FloatingWindow<C> {
    title: String,
    content: C,
    geometry: WindowGeometry,
    viewport: Viewport,
    constraints: WindowConstraints,
    gesture: Gesture,
    host: Rc<dyn PointerListenerHost>,
    open: bool,
}

impl<C> FloatingWindow<C> {
    /// Open a window in `viewport`, placed by `defaults` and clamped to fit.
    pub fn open(
        title: impl Into<String>,
        content: C,
        viewport: Viewport,
        defaults: &WindowDefaults,
        constraints: WindowConstraints,
        host: Rc<dyn PointerListenerHost>,
    ) -> Self {
        let geometry = defaults.initial_geometry(viewport, &constraints);
        let title = title.into();
        debug!(%title, ?geometry, "opening floating window");

        Self {
            title,
            content,
            geometry,
            viewport,
            constraints,
            gesture: Gesture::Idle,
            host,
            open: true,
        }
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Hosted content.
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Swap the hosted content, keeping geometry. Returns the previous content.
    pub fn replace_content(&mut self, content: C) -> C {
        std::mem::replace(&mut self.content, content)
    }

    /// Current geometry.
    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Viewport the geometry is currently clamped against.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Limits in effect.
    pub fn constraints(&self) -> &WindowConstraints {
        &self.constraints
    }

    /// Whether the window is still open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether a header drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Whether a corner resize is in progress.
    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, Gesture::Resizing { .. })
    }

    /// Classify `point` against the current geometry.
    ///
    /// The resize handle sits above everything else, and the close button
    /// takes precedence over the rest of the header.
    pub fn hit_test(&self, point: Point) -> HitRegion {
        let g = &self.geometry;
        if !self.open || !g.contains(point) {
            return HitRegion::Outside;
        }

        let handle_right = g.right() - RESIZE_HANDLE_INSET;
        let handle_bottom = g.bottom() - RESIZE_HANDLE_INSET;
        if point.x >= handle_right - RESIZE_HANDLE_SIZE
            && point.x <= handle_right
            && point.y >= handle_bottom - RESIZE_HANDLE_SIZE
            && point.y <= handle_bottom
        {
            return HitRegion::ResizeHandle;
        }

        if point.y < g.position.y + self.constraints.header_height {
            if point.x >= g.right() - CLOSE_BUTTON_WIDTH {
                return HitRegion::CloseButton;
            }
            return HitRegion::Header;
        }

        HitRegion::Content
    }

    /// Handle a pointer press at `point`.
    ///
    /// Presses are ignored while a gesture is already running or once the
    /// window is closed.
    pub fn pointer_down(&mut self, point: Point) -> PointerAction {
        if !matches!(self.gesture, Gesture::Idle) {
            trace!("pointer down ignored during active gesture");
            return PointerAction::Ignored;
        }

        match self.hit_test(point) {
            HitRegion::Header => {
                self.gesture = Gesture::Dragging {
                    pointer_offset: point.offset_from(self.geometry.position),
                    _listeners: self.host.register(GestureKind::Drag),
                };
                trace!(?point, "drag started");
                PointerAction::DragStarted
            }
            HitRegion::ResizeHandle => {
                self.gesture = Gesture::Resizing {
                    anchor_pointer: point,
                    anchor_size: self.geometry.size,
                    _listeners: self.host.register(GestureKind::Resize),
                };
                trace!(?point, "resize started");
                PointerAction::ResizeStarted
            }
            HitRegion::CloseButton => {
                self.close();
                PointerAction::Closed
            }
            HitRegion::Content | HitRegion::Outside => PointerAction::Ignored,
        }
    }

    /// Handle a pointer move anywhere in the viewport.
    ///
    /// Returns whether an active gesture consumed the move.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        match &self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging { pointer_offset, .. } => {
                let desired = point.offset_from(*pointer_offset);
                self.geometry.position =
                    fit_position(desired, self.geometry.size, self.viewport, &self.constraints);
                true
            }
            Gesture::Resizing {
                anchor_pointer,
                anchor_size,
                ..
            } => {
                let delta = point.offset_from(*anchor_pointer);
                let desired = Size::new(
                    anchor_size.width + delta.x,
                    anchor_size.height + delta.y,
                );
                let size = fit_size(desired, self.viewport, &self.constraints);
                self.geometry = WindowGeometry {
                    position: fit_position(
                        self.geometry.position,
                        size,
                        self.viewport,
                        &self.constraints,
                    ),
                    size,
                };
                true
            }
        }
    }

    /// End the active gesture, keeping the last clamped geometry.
    pub fn pointer_up(&mut self) {
        if !matches!(self.gesture, Gesture::Idle) {
            trace!(geometry = ?self.geometry, "gesture ended");
        }
        self.gesture = Gesture::Idle;
    }

    /// React to a viewport size change.
    ///
    /// Values already in bounds for the new viewport are left alone.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let refitted = refit(self.geometry, viewport, &self.constraints);
        if refitted != self.geometry {
            debug!(?viewport, from = ?self.geometry, to = ?refitted, "window refitted");
            self.geometry = refitted;
        }
    }

    /// Close the window, ending any gesture.
    pub fn close(&mut self) {
        if self.open {
            debug!(title = %self.title, "closing floating window");
        }
        self.gesture = Gesture::Idle;
        self.open = false;
    }
}
