#![forbid(unsafe_code)]

//! Reduced-motion preference signal.
//!
//! The preference only ever selects between animated and static
//! presentation. It never changes timing or decision logic: a notification
//! expires after the same time-to-live either way.

use std::cell::Cell;
use std::rc::Rc;

use crate::environment::Environment;

/// Presentation style selected by the motion preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Motion {
    /// Transitions and entrance/exit animations are allowed.
    #[default]
    Full,
    /// Present changes instantly.
    Reduced,
}

impl Motion {
    /// Pick the animated or static variant of something.
    pub fn choose<T>(self, animated: T, still: T) -> T {
        match self {
            Self::Full => animated,
            Self::Reduced => still,
        }
    }
}

/// Shared, read-mostly reduced-motion flag.
///
/// Clones share the same flag, so a host can update the preference once
/// (e.g. from a media-query listener) and every holder sees it.
#[derive(Debug, Clone, Default)]
pub struct MotionPreference {
    reduced: Rc<Cell<bool>>,
}

impl MotionPreference {
    /// Create a preference with an explicit value.
    #[must_use]
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced: Rc::new(Cell::new(reduced)),
        }
    }

    /// Read the preference from the environment.
    #[must_use]
    pub fn detect(env: &dyn Environment) -> Self {
        Self::new(env.prefers_reduced_motion())
    }

    /// Whether the user asked for reduced motion.
    #[must_use]
    pub fn is_reduced(&self) -> bool {
        self.reduced.get()
    }

    /// The presentation style to use.
    #[must_use]
    pub fn motion(&self) -> Motion {
        if self.is_reduced() {
            Motion::Reduced
        } else {
            Motion::Full
        }
    }

    /// Update the preference. Returns `true` if it changed.
    pub fn set(&self, reduced: bool) -> bool {
        self.reduced.replace(reduced) != reduced
    }

    /// Re-read the preference from the environment.
    pub fn refresh(&self, env: &dyn Environment) -> bool {
        self.set(env.prefers_reduced_motion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnvironment;

    #[test]
    fn clones_share_the_flag() {
        let pref = MotionPreference::new(false);
        let view = pref.clone();
        assert!(pref.set(true));
        assert!(view.is_reduced());
        assert_eq!(view.motion(), Motion::Reduced);
        assert!(!pref.set(true));
    }

    #[test]
    fn detect_and_refresh_follow_environment() {
        let env = TestEnvironment::new();
        let pref = MotionPreference::detect(&*env);
        assert_eq!(pref.motion(), Motion::Full);

        env.set_reduced_motion(true);
        assert!(pref.refresh(&*env));
        assert!(pref.is_reduced());
    }

    #[test]
    fn choose_selects_variant() {
        assert_eq!(Motion::Full.choose("slide", "none"), "slide");
        assert_eq!(Motion::Reduced.choose("slide", "none"), "none");
    }
}
