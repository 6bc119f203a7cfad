#![forbid(unsafe_code)]

//! Element identity and the focusability rule.
//!
//! The primitives never hold host elements directly. They hold an
//! [`ElementId`] and ask the [`Environment`](crate::environment::Environment)
//! about it. [`ElementInfo`] describes the few properties that decide whether
//! an element takes part in sequential (Tab) focus traversal, so every host
//! adapter applies the same rule.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique element IDs.
static ELEMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate a new, process-unique element ID.
    #[must_use]
    pub fn next() -> Self {
        Self(ELEMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw value handed out by a host adapter.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What kind of element this is, as far as focus is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementKind {
    /// A hyperlink. Only focusable when it has an address.
    Link {
        /// Whether the link carries an `href`.
        has_href: bool,
    },
    /// A button.
    Button,
    /// A text/checkbox/radio input.
    Input,
    /// A select box.
    Select,
    /// A multi-line text area.
    TextArea,
    /// Anything else (div, span, section...).
    #[default]
    Generic,
}

impl ElementKind {
    /// Whether this kind is a form control that honours `disabled`.
    #[must_use]
    pub const fn is_form_control(self) -> bool {
        matches!(
            self,
            Self::Button | Self::Input | Self::Select | Self::TextArea
        )
    }
}

/// Focus-relevant properties of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementInfo {
    /// Element kind.
    pub kind: ElementKind,
    /// `disabled` attribute (form controls only).
    pub disabled: bool,
    /// Hidden from layout (no box is generated for it or an ancestor).
    pub hidden: bool,
    /// Explicit `tabindex`, if any.
    pub tab_index: Option<i32>,
}

impl ElementInfo {
    /// A generic container element.
    #[must_use]
    pub const fn generic() -> Self {
        Self {
            kind: ElementKind::Generic,
            disabled: false,
            hidden: false,
            tab_index: None,
        }
    }

    /// A button.
    #[must_use]
    pub const fn button() -> Self {
        Self {
            kind: ElementKind::Button,
            ..Self::generic()
        }
    }

    /// A text input.
    #[must_use]
    pub const fn input() -> Self {
        Self {
            kind: ElementKind::Input,
            ..Self::generic()
        }
    }

    /// A link with or without an address.
    #[must_use]
    pub const fn link(has_href: bool) -> Self {
        Self {
            kind: ElementKind::Link { has_href },
            ..Self::generic()
        }
    }

    /// Set the `disabled` flag.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the hidden flag.
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set an explicit `tabindex`.
    #[must_use]
    pub const fn tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    /// Whether the element is reachable by sequential focus traversal.
    ///
    /// An element qualifies when it is not hidden and is one of: a link with
    /// an address, a non-disabled form control, or any element with an
    /// explicit non-negative `tabindex`.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        if self.hidden {
            return false;
        }
        let by_kind = match self.kind {
            ElementKind::Link { has_href } => has_href,
            kind if kind.is_form_control() => !self.disabled,
            _ => false,
        };
        by_kind || self.tab_index.is_some_and(|t| t >= 0)
    }
}
