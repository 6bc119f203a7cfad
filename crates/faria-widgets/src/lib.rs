#![forbid(unsafe_code)]

//! Interaction primitives for FrankenARIA: focus containment, roving
//! navigation, tabs, menus, overlays and notifications.
//!
//! None of these render markup. Each one owns the state machine and hands
//! the presentation layer what it needs: which element to focus, which
//! attributes to set, and what changed.

pub mod aria;
pub mod focus_trap;
pub mod menu;
pub mod notification;
pub mod overlay;
pub mod roving;
pub mod scroll_lock;
pub mod tabs;
pub mod typeahead;

pub use aria::{AriaAttrs, Politeness};
pub use focus_trap::{FocusTrap, FocusTrapConfig, InitialFocus};
pub use menu::{Menu, MenuEvent, MenuItem, menu_config};
pub use notification::{
    Notification, NotificationId, NotificationKind, NotificationQueue, NotificationRequest,
    QueueConfig, Ttl,
};
pub use overlay::{CloseReason, Overlay, OverlayConfig, OverlayEvent, OverlayPhase, OverlayRole};
pub use roving::{NavCommand, Orientation, RovingConfig, RovingItem, RovingSet};
pub use scroll_lock::ScrollLock;
pub use tabs::{Tab, TabPanel, Tabs};
pub use typeahead::{Typeahead, TypeaheadConfig};
