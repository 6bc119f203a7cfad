#![forbid(unsafe_code)]

//! FrankenARIA public facade crate.
//!
//! Re-exports the commonly used types from the internal crates and offers a
//! prelude for day-to-day use. Form support sits behind the default `forms`
//! feature.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use faria_core::click_outside::ClickOutside;
pub use faria_core::controllable::{ControlMode, Controllable};
pub use faria_core::element::{ElementId, ElementInfo, ElementKind};
pub use faria_core::environment::{Environment, SharedEnvironment};
pub use faria_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind,
};
pub use faria_core::motion::{Motion, MotionPreference};
pub use faria_core::registry::Registry;
pub use faria_core::scope::Scope;
pub use faria_core::timer::Timers;
pub use faria_core::UsageError;

#[cfg(feature = "test-helpers")]
pub use faria_core::testing::TestEnvironment;

// --- Widget re-exports -----------------------------------------------------

pub use faria_widgets::{
    AriaAttrs, CloseReason, FocusTrap, FocusTrapConfig, InitialFocus, Menu, MenuEvent, MenuItem,
    NavCommand, Notification, NotificationId, NotificationKind, NotificationQueue,
    NotificationRequest, Orientation, Overlay, OverlayConfig, OverlayEvent, OverlayPhase,
    OverlayRole, Politeness, QueueConfig, RovingConfig, RovingItem, RovingSet, ScrollLock, Tab,
    TabPanel, Tabs, Ttl, Typeahead, TypeaheadConfig, menu_config,
};

// --- Form re-exports -------------------------------------------------------

#[cfg(feature = "forms")]
pub use faria_forms::{
    Field, FieldSnapshot, Form, Pattern, Rule, Rules, SubmitOutcome, ValidationError,
    ValidationResult, Values,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error for applications built on FrankenARIA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A component was wired outside its owner or named an unknown item.
    Usage(UsageError),
    /// A value failed validation where the caller chose to treat that as fatal.
    #[cfg(feature = "forms")]
    Validation(ValidationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(err) => write!(f, "{err}"),
            #[cfg(feature = "forms")]
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Usage(err) => Some(err),
            #[cfg(feature = "forms")]
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<UsageError> for Error {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}

#[cfg(feature = "forms")]
impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Standard result type for FrankenARIA APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AriaAttrs, Controllable, ElementId, Environment, Error, Event, KeyCode, KeyEvent, Menu,
        MenuItem, Modifiers, NotificationQueue, NotificationRequest, Overlay, OverlayConfig,
        OverlayEvent, Result, RovingConfig, Tab, TabPanel, Tabs,
    };

    #[cfg(feature = "forms")]
    pub use crate::{Field, Form, Rules, SubmitOutcome};

    pub use crate::{core, widgets};

    #[cfg(feature = "forms")]
    pub use crate::forms;
}

pub use faria_core as core;
#[cfg(feature = "forms")]
pub use faria_forms as forms;
pub use faria_widgets as widgets;
