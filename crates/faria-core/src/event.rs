#![forbid(unsafe_code)]

//! Canonical input events consumed by the interaction primitives.
//!
//! Host adapters translate native keyboard, pointer and focus events into
//! these types before handing them to a primitive. All events derive
//! `Clone`, `PartialEq` and `Eq` so tests can build and compare them freely.
//!
//! # Design Notes
//!
//! - Pointer events carry the element they hit instead of coordinates; the
//!   primitives only ever ask "is this inside that boundary?".
//! - `KeyEventKind` defaults to `Press`; primitives ignore `Release`.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::element::ElementId;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event, delivered to the focused element.
    Key(KeyEvent),

    /// A pointer event, with the element it landed on.
    Pointer(PointerEvent),

    /// An element received keyboard focus.
    FocusIn(ElementId),

    /// An element lost keyboard focus.
    FocusOut(ElementId),
}

impl Event {
    /// Returns the key event if this is a key press or repeat.
    #[must_use]
    pub fn key_press(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(key) if key.kind != KeyEventKind::Release => Some(key),
            _ => None,
        }
    }

    /// Returns the pointer event if this is one.
    #[must_use]
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match self {
            Self::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

impl From<PointerEvent> for Event {
    fn from(pointer: PointerEvent) -> Self {
        Self::Pointer(pointer)
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with no modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// The character this key would type, if it is a printable key without
    /// command modifiers (Shift is allowed).
    ///
    /// Used by typeahead to decide which keystrokes feed the search buffer.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !c.is_control() && !self.ctrl() && !self.alt() && !self.super_key() =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    /// Forward sequential-focus traversal (Tab without Shift).
    #[must_use]
    pub fn is_tab_forward(&self) -> bool {
        self.code == KeyCode::Tab && !self.shift()
    }

    /// Backward sequential-focus traversal (Shift+Tab, reported either as
    /// `BackTab` or as `Tab` with Shift held).
    #[must_use]
    pub fn is_tab_backward(&self) -> bool {
        self.code == KeyCode::BackTab || (self.code == KeyCode::Tab && self.shift())
    }

    /// Enter or Space, the two keys that activate buttons and menu items.
    #[must_use]
    pub fn is_activation(&self) -> bool {
        matches!(self.code, KeyCode::Enter | KeyCode::Char(' '))
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Delete key.
    Delete,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key or pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// The innermost element under the pointer.
    pub target: ElementId,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary-button press on `target`.
    #[must_use]
    pub const fn down(target: ElementId) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), target)
    }

    /// Pointer entered `target`.
    #[must_use]
    pub const fn enter(target: ElementId) -> Self {
        Self::new(PointerEventKind::Enter, target)
    }

    /// Pointer left `target`.
    #[must_use]
    pub const fn leave(target: ElementId) -> Self {
        Self::new(PointerEventKind::Leave, target)
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this is a button press (any button).
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self.kind, PointerEventKind::Down(_))
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved onto the target.
    Enter,

    /// Pointer moved off the target.
    Leave,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary button (left mouse, touch, pen tip).
    Primary,

    /// Secondary button (right mouse).
    Secondary,

    /// Auxiliary button (wheel click).
    Auxiliary,
}
