//! Viewport-scope pointer listeners.
//!
//! While a drag or resize is in progress the window listens for pointer moves
//! and releases anywhere in the viewport, not only over itself. Those
//! registrations are scoped to the gesture: a [`ListenerGuard`] is handed out
//! when the gesture starts and deregisters on drop, which covers both the
//! normal pointer-up and the window being torn down mid-gesture.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Which gesture a registration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Header drag.
    Drag,
    /// Corner resize.
    Resize,
}

/// Something that can route viewport pointer events to a window.
pub trait PointerListenerHost: fmt::Debug {
    /// Register move/up listeners for `gesture`. They stay registered until
    /// the returned guard is dropped.
    fn register(&self, gesture: GestureKind) -> ListenerGuard;
}

/// Keeps a listener registration alive.
#[must_use = "dropping the guard deregisters the listeners immediately"]
pub struct ListenerGuard {
    gesture: GestureKind,
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    /// Guard running `release` when dropped.
    pub fn new(gesture: GestureKind, release: impl FnOnce() + 'static) -> Self {
        Self {
            gesture,
            release: Some(Box::new(release)),
        }
    }

    /// The gesture this registration was made for.
    pub fn gesture(&self) -> GestureKind {
        self.gesture
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("gesture", &self.gesture)
            .field("armed", &self.release.is_some())
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// In-process [`PointerListenerHost`] that counts live registrations.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    active: Rc<Cell<usize>>,
    registered: Rc<Cell<u64>>,
}

impl ListenerRegistry {
    /// Create a registry with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations whose guard is still alive.
    pub fn active_count(&self) -> usize {
        self.active.get()
    }

    /// Registrations made over the registry's lifetime.
    pub fn total_registered(&self) -> u64 {
        self.registered.get()
    }
}

impl PointerListenerHost for ListenerRegistry {
    fn register(&self, gesture: GestureKind) -> ListenerGuard {
        self.active.set(self.active.get() + 1);
        self.registered.set(self.registered.get() + 1);
        trace!(?gesture, active = self.active.get(), "pointer listeners registered");

        let active = Rc::clone(&self.active);
        ListenerGuard::new(gesture, move || {
            active.set(active.get().saturating_sub(1));
            trace!(?gesture, active = active.get(), "pointer listeners released");
        })
    }
}
