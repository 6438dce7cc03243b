//! Activity status registry — process-wide glyph activity flags.
//!
//! Two independent flags coordinate all glyph-owning subsystems:
//! `animation_active` (owned by the playback worker) and `all_led_active`
//! (owned by external collaborators such as torch mode). Both are atomics, so
//! readers never observe a torn update. A condvar lets a `wait`-flagged
//! playback park passively until the previous playback's cleanup clears the
//! active flag, instead of spinning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shared activity flags. Create once per process and pass by `Arc` to the
/// player and to anything that needs to coordinate with playback.
#[derive(Debug, Default)]
pub struct StatusRegistry {
    animation_active: AtomicBool,
    all_led_active: AtomicBool,
    idle_lock: Mutex<()>,
    idle_cv: Condvar,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an animation playback is between its first frame write and its
    /// final cleanup.
    pub fn is_animation_active(&self) -> bool {
        self.animation_active.load(Ordering::SeqCst)
    }

    /// Set the animation flag. Clearing it wakes any playback parked in
    /// [`wait_animation_idle`](Self::wait_animation_idle).
    pub fn set_animation_active(&self, active: bool) {
        // The store happens under the condvar lock so a waiter cannot check
        // the flag and park between our store and notify.
        let _guard = self
            .idle_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.animation_active.store(active, Ordering::SeqCst);
        if !active {
            self.idle_cv.notify_all();
        }
    }

    /// Whether all LEDs are forced on by another subsystem (torch mode).
    pub fn is_all_led_active(&self) -> bool {
        self.all_led_active.load(Ordering::SeqCst)
    }

    pub fn set_all_led_active(&self, active: bool) {
        self.all_led_active.store(active, Ordering::SeqCst);
    }

    /// Park until `animation_active` is false, or until `timeout` elapses.
    ///
    /// Returns `true` if the flag is clear (possibly immediately), `false` on
    /// timeout. The bound exists so a hung cleanup cannot wedge the worker
    /// forever.
    pub fn wait_animation_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self
            .idle_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while self.animation_active.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (g, _) = self
                .idle_cv
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            guard = g;
        }
        true
    }
}
