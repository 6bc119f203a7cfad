#![forbid(unsafe_code)]

//! Host environment adapter.
//!
//! Focus containment, scroll locking and outside-click detection all touch
//! process-wide host state: "which element has keyboard focus" and "is the
//! page allowed to scroll". [`Environment`] is the narrow interface through
//! which the primitives read and write that state, so the state machines can
//! be driven against a fake in tests and against the real document in an
//! application.
//!
//! # Contract
//!
//! - Methods take `&self`; adapters use interior mutability, the same way a
//!   DOM binding does.
//! - [`Environment::contains`] is inclusive: an element contains itself.
//! - [`Environment::focusable_descendants`] returns elements in document
//!   order, excludes the container itself, and must reflect the tree at the
//!   moment of the call (callers never cache the result).
//! - [`Environment::focus`] on a detached element is ignored.
//! - [`Environment::focus`] may be called while a primitive's state is
//!   borrowed. An adapter whose host fires focus events inline (as a DOM
//!   `element.focus()` does) may forward `FocusIn`/`FocusOut` to a menu or
//!   tab strip, whose `handle_event` ignores them without borrowing. Any
//!   other event must be queued and dispatched after the call returns.

use std::rc::Rc;

use crate::element::ElementId;

/// Narrow view of the host document used by the interaction primitives.
pub trait Environment {
    /// The element that currently has keyboard focus.
    fn active_element(&self) -> Option<ElementId>;

    /// Move keyboard focus to `element`.
    fn focus(&self, element: ElementId);

    /// Whether `element` is still attached to the document.
    fn is_attached(&self, element: ElementId) -> bool;

    /// Whether `element` is `container` or one of its descendants.
    fn contains(&self, container: ElementId, element: ElementId) -> bool;

    /// Focusable descendants of `container`, in document order.
    fn focusable_descendants(&self, container: ElementId) -> Vec<ElementId>;

    /// Whether background scrolling is currently suppressed.
    fn scroll_locked(&self) -> bool;

    /// Suppress or permit background scrolling.
    fn set_scroll_locked(&self, locked: bool);

    /// The user's reduced-motion preference.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

/// Shared handle to the environment, held by every session that must
/// restore host state when it ends.
pub type SharedEnvironment = Rc<dyn Environment>;
