//! The page the lightbox is drawn over
//!
//! While a photo is open the underlying page must not scroll and the
//! lightbox key bindings must be live. `SurfaceGuard` ties both to a
//! value's lifetime so every exit path, including dropping the whole
//! gallery, gives them back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Host-side effects of an open lightbox
pub trait Surface: Send + Sync {
    fn lock_scroll(&self);
    fn unlock_scroll(&self);
    fn bind_keys(&self);
    fn unbind_keys(&self);
}

/// Holds the scroll lock and key bindings until dropped
pub struct SurfaceGuard {
    surface: Arc<dyn Surface>,
}

impl SurfaceGuard {
    pub fn acquire(surface: Arc<dyn Surface>) -> Self {
        surface.lock_scroll();
        surface.bind_keys();
        Self { surface }
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.surface.unbind_keys();
        self.surface.unlock_scroll();
    }
}

/// Surface that only records its state
///
/// Hosts with nothing to lock (the terminal front-end, tests) use it to
/// know whether lightbox keys should be routed.
#[derive(Debug, Default)]
pub struct FlagSurface {
    scroll_locked: AtomicBool,
    keys_bound: AtomicBool,
    acquisitions: AtomicUsize,
}

impl FlagSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked.load(Ordering::SeqCst)
    }

    pub fn keys_bound(&self) -> bool {
        self.keys_bound.load(Ordering::SeqCst)
    }

    /// How many times key bindings were registered
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl Surface for FlagSurface {
    fn lock_scroll(&self) {
        self.scroll_locked.store(true, Ordering::SeqCst);
    }

    fn unlock_scroll(&self) {
        self.scroll_locked.store(false, Ordering::SeqCst);
    }

    fn bind_keys(&self) {
        self.keys_bound.store(true, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
    }

    fn unbind_keys(&self) {
        self.keys_bound.store(false, Ordering::SeqCst);
    }
}
