#![forbid(unsafe_code)]

//! Focus containment for layered surfaces.
//!
//! A [`FocusTrap`] session captures the focused element when it starts,
//! moves focus into its container, keeps Tab/Shift+Tab cycling among the
//! container's focusable descendants, and hands focus back when it ends.
//!
//! # Invariants
//!
//! - The prior focus is captured once, at activation, and restored at most
//!   once: by [`FocusTrap::release`] or by `Drop`, whichever comes first.
//! - The focusable list is queried from the environment on every traversal,
//!   never cached, so content added or removed mid-session is honoured.
//!
//! # Failure Modes
//!
//! - A container with no focusable descendants gets no initial focus and
//!   traversal interception is a no-op (`handle_key` returns `false`).
//! - If the prior element was detached by the time the session ends,
//!   restoration is skipped silently.

use faria_core::element::ElementId;
use faria_core::environment::SharedEnvironment;
use faria_core::event::{Event, KeyEvent};

/// Where focus lands when a trap starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialFocus {
    /// First focusable descendant of the container.
    #[default]
    First,
    /// A specific element (falls back to `First` if it is outside the
    /// container or detached).
    Element(ElementId),
    /// Leave focus where it is.
    None,
}

/// Focus trap configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FocusTrapConfig {
    /// Where focus lands on activation.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub initial_focus: InitialFocus,
    /// Restore the prior focus when the trap is released.
    pub restore_focus: bool,
}

impl Default for FocusTrapConfig {
    fn default() -> Self {
        Self {
            initial_focus: InitialFocus::First,
            restore_focus: true,
        }
    }
}

impl FocusTrapConfig {
    /// Default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus `element` on activation.
    #[must_use]
    pub fn with_initial_focus(mut self, element: ElementId) -> Self {
        self.initial_focus = InitialFocus::Element(element);
        self
    }

    /// Do not move focus on activation.
    #[must_use]
    pub fn without_initial_focus(mut self) -> Self {
        self.initial_focus = InitialFocus::None;
        self
    }

    /// Enable or disable focus restoration.
    #[must_use]
    pub fn with_restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }
}

/// An active focus containment session.
pub struct FocusTrap {
    env: SharedEnvironment,
    container: ElementId,
    prior: Option<ElementId>,
    restore_focus: bool,
    active: bool,
}

impl std::fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTrap")
            .field("container", &self.container)
            .field("prior", &self.prior)
            .field("active", &self.active)
            .finish()
    }
}

impl FocusTrap {
    /// Start a session on `container`.
    #[must_use]
    pub fn activate(
        env: SharedEnvironment,
        container: ElementId,
        config: &FocusTrapConfig,
    ) -> Self {
        let prior = env.active_element();
        let trap = Self {
            env,
            container,
            prior,
            restore_focus: config.restore_focus,
            active: true,
        };
        faria_core::debug!(
            container = container.raw(),
            prior = ?prior.map(ElementId::raw),
            "focus trap activated"
        );

        match config.initial_focus {
            InitialFocus::None => {}
            InitialFocus::Element(el)
                if trap.env.is_attached(el) && trap.env.contains(container, el) =>
            {
                trap.env.focus(el);
            }
            InitialFocus::Element(_) | InitialFocus::First => {
                trap.focus_first();
            }
        }
        trap
    }

    /// The containing element.
    #[must_use]
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// The element focused before the session started.
    #[must_use]
    pub fn prior_focus(&self) -> Option<ElementId> {
        self.prior
    }

    /// Whether the session is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current focusable descendants, freshly queried.
    #[must_use]
    pub fn focusables(&self) -> Vec<ElementId> {
        self.env.focusable_descendants(self.container)
    }

    /// Focus the first focusable descendant. Returns `false` if there is none.
    pub fn focus_first(&self) -> bool {
        self.focus_at(|list| list.first().copied())
    }

    /// Focus the last focusable descendant. Returns `false` if there is none.
    pub fn focus_last(&self) -> bool {
        self.focus_at(|list| list.last().copied())
    }

    /// Move focus forward, wrapping from the last element to the first.
    pub fn focus_next(&self) -> bool {
        let current = self.env.active_element();
        self.focus_at(|list| {
            let next = current
                .and_then(|c| list.iter().position(|&e| e == c))
                .map_or(0, |i| (i + 1) % list.len());
            list.get(next).copied()
        })
    }

    /// Move focus backward, wrapping from the first element to the last.
    pub fn focus_prev(&self) -> bool {
        let current = self.env.active_element();
        self.focus_at(|list| {
            let prev = match current.and_then(|c| list.iter().position(|&e| e == c)) {
                Some(0) | None => list.len().checked_sub(1)?,
                Some(i) => i - 1,
            };
            list.get(prev).copied()
        })
    }

    fn focus_at(&self, pick: impl FnOnce(&[ElementId]) -> Option<ElementId>) -> bool {
        if !self.active {
            return false;
        }
        let list = self.focusables();
        match pick(&list) {
            Some(target) => {
                self.env.focus(target);
                true
            }
            None => false,
        }
    }

    /// Intercept Tab/Shift+Tab. Returns `true` when the key was consumed and
    /// the host should suppress its default traversal.
    pub fn handle_key(&self, key: &KeyEvent) -> bool {
        if key.is_tab_backward() {
            self.focus_prev()
        } else if key.is_tab_forward() {
            self.focus_next()
        } else {
            false
        }
    }

    /// Intercept traversal keys, and pull focus back in when it lands
    /// outside the container.
    pub fn handle_event(&self, event: &Event) -> bool {
        match event {
            Event::FocusIn(target)
                if self.active && !self.env.contains(self.container, *target) =>
            {
                faria_core::trace!(target = target.raw(), "focus escaped trap, pulling back");
                self.focus_first()
            }
            _ => event.key_press().is_some_and(|key| self.handle_key(key)),
        }
    }

    /// End the session, restoring prior focus if it is still attached.
    ///
    /// Returns `true` if focus was restored. Later calls (and `Drop`) do
    /// nothing.
    pub fn release(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        let Some(prior) = self.prior.filter(|_| self.restore_focus) else {
            faria_core::debug!(container = self.container.raw(), "focus trap released");
            return false;
        };
        if self.env.is_attached(prior) {
            self.env.focus(prior);
            faria_core::debug!(
                container = self.container.raw(),
                restored = prior.raw(),
                "focus trap released"
            );
            true
        } else {
            faria_core::trace!(prior = prior.raw(), "prior focus detached, not restoring");
            false
        }
    }
}

impl Drop for FocusTrap {
    fn drop(&mut self) {
        self.release();
    }
}
