#![forbid(unsafe_code)]

//! Background scroll suppression.
//!
//! [`ScrollLock`] saves the host's scroll-lock flag, locks, and puts the
//! saved value back when dropped. Restoring the saved value rather than
//! unlocking means properly nested locks compose: the outermost guard to be
//! dropped leaves the page as it found it.

use faria_core::environment::SharedEnvironment;

/// RAII guard over the host scroll-lock flag.
pub struct ScrollLock {
    env: SharedEnvironment,
    saved: bool,
    released: bool,
}

impl std::fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLock")
            .field("saved", &self.saved)
            .field("released", &self.released)
            .finish()
    }
}

impl ScrollLock {
    /// Lock scrolling, remembering the previous state.
    #[must_use]
    pub fn acquire(env: SharedEnvironment) -> Self {
        let saved = env.scroll_locked();
        env.set_scroll_locked(true);
        faria_core::trace!(saved, "scroll locked");
        Self {
            env,
            saved,
            released: false,
        }
    }

    /// The scroll-lock state captured at acquisition.
    #[must_use]
    pub fn saved_state(&self) -> bool {
        self.saved
    }

    /// Restore the saved state now. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.env.set_scroll_locked(self.saved);
        faria_core::trace!(restored = self.saved, "scroll lock released");
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.release();
    }
}
