//! Preview window placement and gestures.

use pdfstage::geometry::{Point, Size, Viewport, WindowConstraints};
use pdfstage::window::{FloatingWindow, ListenerRegistry, PointerAction, WindowDefaults};
use std::rc::Rc;

fn open(viewport: Viewport) -> (ListenerRegistry, FloatingWindow<&'static str>) {
    let registry = ListenerRegistry::new();
    let window = FloatingWindow::open(
        "Preview",
        "doc",
        viewport,
        &WindowDefaults::default(),
        WindowConstraints::default(),
        Rc::new(registry.clone()),
    );
    (registry, window)
}

#[test]
fn test_compact_viewport_initial_geometry() {
    let viewport = Viewport::new(320.0, 480.0);
    let (_, window) = open(viewport);
    let g = window.geometry();

    assert_eq!(g.size, Size::new(294.0, 384.0));
    assert!(g.position.x >= 8.0 && g.position.y >= 8.0);
    assert!(g.right() <= viewport.width - 8.0 + 1e-6);
    assert!(g.bottom() <= viewport.height - 8.0 + 1e-6);
}

#[test]
fn test_drag_far_past_the_edge_pins_to_padding() {
    let viewport = Viewport::new(1280.0, 1000.0);
    let (registry, mut window) = open(viewport);

    let action = window.pointer_down(Point::new(100.0, 50.0));
    assert_eq!(action, PointerAction::DragStarted);
    assert_eq!(registry.active_count(), 1);

    window.pointer_move(Point::new(5000.0, 5000.0));
    window.pointer_up();

    let g = window.geometry();
    assert_eq!(g.right(), viewport.width - 8.0);
    assert_eq!(g.bottom(), viewport.height - 8.0);
    assert_eq!(registry.active_count(), 0);
}

#[test]
fn test_resize_respects_minimum_size() {
    let (_, mut window) = open(Viewport::new(1280.0, 1000.0));
    let g = window.geometry();

    let handle = Point::new(g.right() - 10.0, g.bottom() - 10.0);
    assert_eq!(window.pointer_down(handle), PointerAction::ResizeStarted);
    window.pointer_move(Point::new(handle.x - 2000.0, handle.y - 2000.0));
    window.pointer_up();

    assert_eq!(window.geometry().size, Size::new(260.0, 200.0));
    assert_eq!(window.geometry().position, g.position);
}

#[test]
fn test_dropping_window_mid_gesture_releases_listeners() {
    let (registry, mut window) = open(Viewport::default());
    window.pointer_down(Point::new(60.0, 45.0));
    assert_eq!(registry.active_count(), 1);

    drop(window);
    assert_eq!(registry.active_count(), 0);
}
