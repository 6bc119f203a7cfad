#![forbid(unsafe_code)]

//! Open/close lifecycle for modal surfaces (dialogs, drawers, sheets).
//!
//! # State Machine
//!
//! ```text
//!            open() / sync_open(true)
//!   Closed ────────────────────────────▶ Open
//!     ▲                                   │
//!     └───────────────────────────────────┘
//!      Escape | backdrop press | close() | sync_open(false)
//! ```
//!
//! Entering `Open` starts a session: a [`FocusTrap`] on the content region,
//! then a [`ScrollLock`]. Leaving `Open` ends it in the same order, so prior
//! focus and the prior scroll state both come back.
//!
//! # Invariants
//!
//! - The phase is `Open` exactly while a session exists, and a session
//!   exists exactly while the open flag reads `true`.
//! - One session per overlay: at most one escape handler and one scroll lock
//!   are live for an instance.
//! - Presses inside the content region never count as backdrop presses.
//!
//! # Failure Modes
//!
//! - With a controlled open flag, a close request the owner does not apply
//!   leaves the overlay open and reports [`OverlayEvent::CloseRequested`].
//! - Overlays opened and closed in overlapping (not nested) order are not
//!   coordinated: each restores what it saw when it opened.

use faria_core::click_outside::ClickOutside;
use faria_core::controllable::Controllable;
use faria_core::element::ElementId;
use faria_core::environment::SharedEnvironment;
use faria_core::event::{Event, KeyCode};

use crate::aria::{AriaAttrs, dom_id};
use crate::focus_trap::{FocusTrap, FocusTrapConfig};
use crate::scroll_lock::ScrollLock;

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayPhase {
    /// Not shown, no side effects.
    #[default]
    Closed,
    /// Shown with focus trapped and scrolling suppressed.
    Open,
}

/// Why an overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Escape key.
    Escape,
    /// Press on the backdrop, outside the content region.
    Backdrop,
    /// Explicit close from content (a Close/Cancel button).
    Explicit,
    /// The owner of a controlled open flag set it to `false`.
    Owner,
}

/// The role announced for the content region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverlayRole {
    /// `dialog`.
    #[default]
    Dialog,
    /// `alertdialog`: interrupts with an urgent message.
    AlertDialog,
}

impl OverlayRole {
    /// The ARIA role string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
        }
    }
}

/// Overlay behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayConfig {
    /// Close on Escape.
    pub close_on_escape: bool,
    /// Close on a press outside the content region.
    pub close_on_backdrop: bool,
    /// Suppress background scrolling while open.
    pub lock_scroll: bool,
    /// Announced role.
    pub role: OverlayRole,
    /// Focus trap settings for the session.
    pub focus: FocusTrapConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            close_on_escape: true,
            close_on_backdrop: true,
            lock_scroll: true,
            role: OverlayRole::Dialog,
            focus: FocusTrapConfig::default(),
        }
    }
}

impl OverlayConfig {
    /// Default config: every close path enabled, scroll locked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable Escape-to-close.
    #[must_use]
    pub fn with_close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    /// Enable or disable backdrop-press-to-close.
    #[must_use]
    pub fn with_close_on_backdrop(mut self, enabled: bool) -> Self {
        self.close_on_backdrop = enabled;
        self
    }

    /// Enable or disable the scroll lock.
    #[must_use]
    pub fn with_lock_scroll(mut self, enabled: bool) -> Self {
        self.lock_scroll = enabled;
        self
    }

    /// Set the announced role.
    #[must_use]
    pub fn with_role(mut self, role: OverlayRole) -> Self {
        self.role = role;
        self
    }

    /// Set the focus trap settings.
    #[must_use]
    pub fn with_focus(mut self, focus: FocusTrapConfig) -> Self {
        self.focus = focus;
        self
    }
}

/// Result of an overlay operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// Nothing happened; the host should run its default handling.
    None,
    /// Input was consumed (e.g. a trapped Tab).
    Handled,
    /// The overlay opened.
    Opened,
    /// Opening was requested from the owner of a controlled flag.
    OpenRequested,
    /// The overlay closed.
    Closed(CloseReason),
    /// Closing was requested from the owner of a controlled flag.
    CloseRequested(CloseReason),
}

#[derive(Debug)]
struct Session {
    // Field order is teardown order: focus first, then scrolling.
    trap: FocusTrap,
    scroll: Option<ScrollLock>,
}

/// A modal surface with a managed open/close lifecycle.
pub struct Overlay {
    env: SharedEnvironment,
    content: ElementId,
    config: OverlayConfig,
    open: Controllable<bool>,
    outside: ClickOutside,
    title: Option<ElementId>,
    description: Option<ElementId>,
    session: Option<Session>,
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("content", &self.content)
            .field("config", &self.config)
            .field("open", &self.open)
            .field("session", &self.session)
            .finish()
    }
}

impl Overlay {
    /// Create an overlay around the `content` region. If `open` already
    /// reads `true`, the session starts immediately.
    #[must_use]
    pub fn new(
        env: SharedEnvironment,
        content: ElementId,
        open: Controllable<bool>,
        config: OverlayConfig,
    ) -> Self {
        let mut overlay = Self {
            env,
            content,
            config,
            open,
            outside: ClickOutside::new(content),
            title: None,
            description: None,
            session: None,
        };
        overlay.reconcile(CloseReason::Owner);
        overlay
    }

    /// Element that labels the content (`aria-labelledby`).
    #[must_use]
    pub fn with_title(mut self, title: ElementId) -> Self {
        self.title = Some(title);
        self
    }

    /// Element that describes the content (`aria-describedby`).
    #[must_use]
    pub fn with_description(mut self, description: ElementId) -> Self {
        self.description = Some(description);
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        if self.session.is_some() {
            OverlayPhase::Open
        } else {
            OverlayPhase::Closed
        }
    }

    /// Whether the overlay is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.phase() == OverlayPhase::Open
    }

    /// Request opening.
    pub fn open(&mut self) -> OverlayEvent {
        if self.is_open() {
            return OverlayEvent::None;
        }
        self.open.set(true);
        self.reconcile(CloseReason::Owner)
            .unwrap_or(OverlayEvent::OpenRequested)
    }

    /// Request closing from content (a Close button).
    pub fn close(&mut self) -> OverlayEvent {
        self.request_close(CloseReason::Explicit)
    }

    /// Request closing for `reason`.
    pub fn request_close(&mut self, reason: CloseReason) -> OverlayEvent {
        if !self.is_open() {
            return OverlayEvent::None;
        }
        self.open.set(false);
        self.reconcile(reason)
            .unwrap_or(OverlayEvent::CloseRequested(reason))
    }

    /// Apply the owner's open flag (controlled mode).
    pub fn sync_open(&mut self, open: bool) -> OverlayEvent {
        if !self.open.sync_external(open) {
            return OverlayEvent::None;
        }
        self.reconcile(CloseReason::Owner)
            .unwrap_or(OverlayEvent::None)
    }

    /// Feed an input event.
    ///
    /// While open: Escape closes (if enabled), Tab/Shift+Tab cycle inside
    /// the content, focus escaping the content is pulled back, and a press
    /// outside the content closes (if enabled). While closed, nothing is
    /// consumed.
    pub fn handle_event(&mut self, event: &Event) -> OverlayEvent {
        let Some(session) = self.session.as_ref() else {
            return OverlayEvent::None;
        };
        match event {
            Event::Key(_) => {
                let Some(key) = event.key_press() else {
                    return OverlayEvent::None;
                };
                if key.code == KeyCode::Escape {
                    return if self.config.close_on_escape {
                        self.request_close(CloseReason::Escape)
                    } else {
                        OverlayEvent::None
                    };
                }
                if session.trap.handle_key(key) {
                    OverlayEvent::Handled
                } else {
                    OverlayEvent::None
                }
            }
            Event::Pointer(pointer) => {
                if self.config.close_on_backdrop
                    && self.outside.handle_pointer(&*self.env, pointer)
                {
                    self.request_close(CloseReason::Backdrop)
                } else {
                    OverlayEvent::None
                }
            }
            Event::FocusIn(_) => {
                if session.trap.handle_event(event) {
                    OverlayEvent::Handled
                } else {
                    OverlayEvent::None
                }
            }
            Event::FocusOut(_) => OverlayEvent::None,
        }
    }

    /// Attributes for the content region.
    #[must_use]
    pub fn content_attrs(&self) -> AriaAttrs {
        let mut attrs = AriaAttrs::new()
            .role(self.config.role.as_str())
            .id(dom_id(self.content, "dialog"))
            .modal(true)
            .tab_index(-1);
        if let Some(title) = self.title {
            attrs = attrs.labelled_by(dom_id(title, "dialog-title"));
        }
        if let Some(description) = self.description {
            attrs = attrs.described_by(dom_id(description, "dialog-description"));
        }
        attrs
    }

    /// Start or end the session so it matches the open flag.
    fn reconcile(&mut self, reason: CloseReason) -> Option<OverlayEvent> {
        match (*self.open.get(), self.session.is_some()) {
            (true, false) => {
                self.start_session();
                Some(OverlayEvent::Opened)
            }
            (false, true) => {
                self.end_session(reason);
                Some(OverlayEvent::Closed(reason))
            }
            _ => None,
        }
    }

    fn start_session(&mut self) {
        let trap = FocusTrap::activate(self.env.clone(), self.content, &self.config.focus);
        let scroll = self
            .config
            .lock_scroll
            .then(|| ScrollLock::acquire(self.env.clone()));
        faria_core::debug!(content = self.content.raw(), "overlay opened");
        self.session = Some(Session { trap, scroll });
    }

    fn end_session(&mut self, reason: CloseReason) {
        if let Some(Session { mut trap, scroll }) = self.session.take() {
            trap.release();
            drop(scroll);
            faria_core::debug!(content = self.content.raw(), reason = ?reason, "overlay closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faria_core::element::ElementInfo;
    use faria_core::environment::Environment;
    use faria_core::event::{KeyEvent, PointerEvent};
    use faria_core::testing::TestEnvironment;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        env: Rc<TestEnvironment>,
        opener: ElementId,
        backdrop: ElementId,
        content: ElementId,
        buttons: Vec<ElementId>,
    }

    fn fixture() -> Fixture {
        let env = TestEnvironment::new();
        let opener = env.append(env.root(), ElementInfo::button());
        let backdrop = env.append(env.root(), ElementInfo::generic());
        let content = env.append(backdrop, ElementInfo::generic());
        let buttons = env.append_all(content, &[ElementInfo::button(), ElementInfo::button()]);
        env.focus(opener);
        Fixture {
            env,
            opener,
            backdrop,
            content,
            buttons,
        }
    }

    impl Fixture {
        fn overlay(&self, config: OverlayConfig) -> Overlay {
            let open = Controllable::uncontrolled(false);
            Overlay::new(self.env.shared(), self.content, open, config)
        }
    }

    fn esc() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Escape))
    }

    #[test]
    fn open_traps_focus_and_locks_scroll() {
        let fx = fixture();
        let mut overlay = fx.overlay(OverlayConfig::default());
        assert_eq!(overlay.phase(), OverlayPhase::Closed);
        assert_eq!(overlay.open(), OverlayEvent::Opened);
        assert_eq!(fx.env.active_element(), Some(fx.buttons[0]));
        assert!(fx.env.scroll_locked());
        assert_eq!(overlay.open(), OverlayEvent::None);
    }

    #[test]
    fn escape_closes_and_restores() {
        let fx = fixture();
        let mut overlay = fx.overlay(OverlayConfig::default());
        overlay.open();
        assert_eq!(overlay.handle_event(&esc()), OverlayEvent::Closed(CloseReason::Escape));
        assert_eq!(fx.env.active_element(), Some(fx.opener));
        assert!(!fx.env.scroll_locked());
        assert_eq!(overlay.handle_event(&esc()), OverlayEvent::None);
    }

    #[test]
    fn escape_can_be_disabled() {
        let fx = fixture();
        let config = OverlayConfig::new().with_close_on_escape(false);
        let mut overlay = fx.overlay(config);
        overlay.open();
        assert_eq!(overlay.handle_event(&esc()), OverlayEvent::None);
        assert!(overlay.is_open());
    }

    #[test]
    fn backdrop_press_closes_content_press_does_not() {
        let fx = fixture();
        let mut overlay = fx.overlay(OverlayConfig::default());
        overlay.open();
        let inside = Event::Pointer(PointerEvent::down(fx.buttons[1]));
        assert_eq!(overlay.handle_event(&inside), OverlayEvent::None);
        assert!(overlay.is_open());

        let backdrop = Event::Pointer(PointerEvent::down(fx.backdrop));
        assert_eq!(overlay.handle_event(&backdrop), OverlayEvent::Closed(CloseReason::Backdrop));
    }

    #[test]
    fn backdrop_close_can_be_disabled() {
        let fx = fixture();
        let config = OverlayConfig::new().with_close_on_backdrop(false);
        let mut overlay = fx.overlay(config);
        overlay.open();
        let backdrop = Event::Pointer(PointerEvent::down(fx.backdrop));
        assert_eq!(overlay.handle_event(&backdrop), OverlayEvent::None);
    }

    #[test]
    fn tab_cycles_inside_content() {
        let fx = fixture();
        let mut overlay = fx.overlay(OverlayConfig::default());
        overlay.open();
        let tab = Event::Key(KeyEvent::new(KeyCode::Tab));
        assert_eq!(overlay.handle_event(&tab), OverlayEvent::Handled);
        assert_eq!(overlay.handle_event(&tab), OverlayEvent::Handled);
        assert_eq!(fx.env.active_element(), Some(fx.buttons[0]));
    }

    #[test]
    fn explicit_close() {
        let fx = fixture();
        let mut overlay = fx.overlay(OverlayConfig::default());
        overlay.open();
        assert_eq!(overlay.close(), OverlayEvent::Closed(CloseReason::Explicit));
        assert_eq!(overlay.close(), OverlayEvent::None);
    }

    #[test]
    fn restores_prior_scroll_lock_state() {
        let fx = fixture();
        fx.env.set_scroll_locked(true);
        let mut overlay = fx.overlay(OverlayConfig::default());
        overlay.open();
        overlay.close();
        assert!(fx.env.scroll_locked());
    }

    #[test]
    fn scroll_lock_can_be_disabled() {
        let fx = fixture();
        let config = OverlayConfig::new().with_lock_scroll(false);
        let mut overlay = fx.overlay(config);
        overlay.open();
        assert!(!fx.env.scroll_locked());
    }

    #[test]
    fn controlled_flag_round_trip() {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&requests);
        let fx = fixture();
        let open = Controllable::controlled(false)
            .on_change(move |v: &bool| sink.borrow_mut().push(*v));
        let mut overlay = Overlay::new(fx.env.shared(), fx.content, open, OverlayConfig::default());

        assert_eq!(overlay.open(), OverlayEvent::OpenRequested);
        assert!(!overlay.is_open());
        assert_eq!(overlay.sync_open(true), OverlayEvent::Opened);

        assert_eq!(overlay.handle_event(&esc()), OverlayEvent::CloseRequested(CloseReason::Escape));
        assert!(overlay.is_open());
        assert_eq!(overlay.sync_open(false), OverlayEvent::Closed(CloseReason::Owner));
        assert_eq!(*requests.borrow(), vec![true, false]);
        assert_eq!(fx.env.active_element(), Some(fx.opener));
    }

    #[test]
    fn mounted_open_starts_session() {
        let fx = fixture();
        let overlay = Overlay::new(
            fx.env.shared(),
            fx.content,
            Controllable::uncontrolled(true),
            OverlayConfig::default(),
        );
        assert!(overlay.is_open());
        assert!(fx.env.scroll_locked());
    }

    #[test]
    fn unmount_while_open_restores_everything() {
        let fx = fixture();
        let mut overlay = fx.overlay(OverlayConfig::default());
        overlay.open();
        drop(overlay);
        assert_eq!(fx.env.active_element(), Some(fx.opener));
        assert!(!fx.env.scroll_locked());
    }

    #[test]
    fn nested_overlays_unwind() {
        let fx = fixture();
        let inner_content = fx.env.append(fx.content, ElementInfo::generic());
        let inner_button = fx.env.append(inner_content, ElementInfo::button());
        let mut outer = fx.overlay(OverlayConfig::default());
        let mut inner = Overlay::new(
            fx.env.shared(),
            inner_content,
            Controllable::uncontrolled(false),
            OverlayConfig::default(),
        );

        outer.open();
        fx.env.focus(fx.buttons[1]);
        inner.open();
        assert_eq!(fx.env.active_element(), Some(inner_button));

        inner.close();
        assert_eq!(fx.env.active_element(), Some(fx.buttons[1]));
        assert!(fx.env.scroll_locked());
        outer.close();
        assert_eq!(fx.env.active_element(), Some(fx.opener));
        assert!(!fx.env.scroll_locked());
    }

    #[test]
    fn content_attrs_wire_title_and_description() {
        let fx = fixture();
        let title = fx.env.append(fx.content, ElementInfo::generic());
        let overlay = fx
            .overlay(OverlayConfig::new().with_role(OverlayRole::AlertDialog))
            .with_title(title)
            .with_description(title);
        let attrs = overlay.content_attrs();
        assert_eq!(attrs.get("role"), Some("alertdialog"));
        assert_eq!(attrs.get("aria-modal"), Some("true"));
        assert_eq!(
            attrs.get("aria-labelledby"),
            Some(dom_id(title, "dialog-title").as_str())
        );
        assert!(attrs.contains("aria-describedby"));
    }
}
