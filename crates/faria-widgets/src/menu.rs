#![forbid(unsafe_code)]

//! Popup menu: a trigger button and a roving list of items.
//!
//! # Keyboard
//!
//! | Focus   | Key                  | Effect                                  |
//! |---------|----------------------|-----------------------------------------|
//! | trigger | Down, Enter, Space   | open, focus first enabled item          |
//! | trigger | Up                   | open, focus last enabled item           |
//! | menu    | Up/Down, Home/End    | move between enabled items (wrapping)   |
//! | menu    | printable characters | typeahead                               |
//! | menu    | Enter, Space         | activate the item, close, focus trigger |
//! | menu    | Escape               | close, focus trigger                    |
//! | menu    | Tab                  | close, leave focus to the host          |
//!
//! A press outside both the trigger and the menu closes it without moving
//! focus.
//!
//! # Failure Modes
//!
//! - Callbacks (`on_select`, the open-flag change callback) run while the
//!   menu's state is borrowed; calling back into the same menu from them
//!   panics with a `RefCell` borrow error. The same holds for an adapter
//!   that synchronously routes a key or pointer event back into the menu
//!   from `Environment::focus`; focus events are safe to route.

use std::fmt;

use faria_core::click_outside::ClickOutside;
use faria_core::controllable::Controllable;
use faria_core::element::ElementId;
use faria_core::environment::SharedEnvironment;
use faria_core::error::UsageError;
use faria_core::event::{Event, KeyCode, KeyEvent, PointerEventKind};
use faria_core::scope::Scope;
use web_time::Instant;

use crate::aria::{AriaAttrs, dom_id};
use crate::roving::{NavCommand, Orientation, RovingConfig, RovingItem, RovingSet};
use crate::typeahead::TypeaheadConfig;

/// Result of feeding input to a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent<K> {
    /// Input not consumed.
    None,
    /// Input consumed without a visible state change (e.g. navigation, or
    /// an open/close request awaiting the owner of a controlled flag).
    Handled,
    /// The menu opened.
    Opened,
    /// The menu closed without a selection.
    Closed,
    /// An item was activated; the menu closed.
    Selected(K),
}

type SelectFn<K> = Box<dyn FnMut(&K)>;

/// Shared state of one menu.
pub struct MenuState<K> {
    env: SharedEnvironment,
    trigger: ElementId,
    content: ElementId,
    roving: RovingSet<K>,
    open: Controllable<bool>,
    outside: ClickOutside,
    pending_focus: Option<NavCommand>,
    on_select: Option<SelectFn<K>>,
}

impl<K: fmt::Debug> fmt::Debug for MenuState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuState")
            .field("trigger", &self.trigger)
            .field("content", &self.content)
            .field("open", &self.open)
            .field("roving", &self.roving)
            .finish()
    }
}

impl<K: Clone + PartialEq> MenuState<K> {
    fn is_open(&self) -> bool {
        *self.open.get()
    }

    /// A typeahead search is in progress, so Space is a character.
    fn is_typing(&self, now: Instant) -> bool {
        self.roving
            .typeahead()
            .and_then(|t| t.expires_at())
            .is_some_and(|deadline| now < deadline)
    }

    fn focus_within_content(&self) -> bool {
        self.env
            .active_element()
            .is_some_and(|el| self.env.contains(self.content, el))
    }

    fn open_with(&mut self, command: NavCommand) -> MenuEvent<K> {
        if self.is_open() {
            self.roving.navigate(command);
            return MenuEvent::Handled;
        }
        self.open.set(true);
        if self.is_open() {
            faria_core::debug!(trigger = self.trigger.raw(), "menu opened");
            self.roving.navigate(command);
            MenuEvent::Opened
        } else {
            self.pending_focus = Some(command);
            MenuEvent::Handled
        }
    }

    fn after_close(&mut self, restore_focus: bool) {
        self.roving.clear_active();
        self.pending_focus = None;
        if restore_focus {
            self.env.focus(self.trigger);
        }
        faria_core::debug!(trigger = self.trigger.raw(), restore_focus, "menu closed");
    }

    fn close(&mut self, restore_focus: bool) -> MenuEvent<K> {
        if !self.is_open() {
            return MenuEvent::None;
        }
        self.open.set(false);
        if self.is_open() {
            return MenuEvent::Handled;
        }
        self.after_close(restore_focus);
        MenuEvent::Closed
    }

    fn activate(&mut self, key: &K) -> MenuEvent<K> {
        if self.roving.item(key).is_none_or(|item| item.disabled) {
            return MenuEvent::None;
        }
        if let Some(on_select) = self.on_select.as_mut() {
            on_select(key);
        }
        self.close(true);
        MenuEvent::Selected(key.clone())
    }

    fn trigger_key(&mut self, key: &KeyEvent) -> MenuEvent<K> {
        match key.code {
            KeyCode::Up => self.open_with(NavCommand::Last),
            KeyCode::Down => self.open_with(NavCommand::First),
            _ if key.is_activation() => {
                if self.is_open() {
                    self.close(true)
                } else {
                    self.open_with(NavCommand::First)
                }
            }
            _ => MenuEvent::None,
        }
    }

    fn content_key(&mut self, key: &KeyEvent, now: Instant) -> MenuEvent<K> {
        if !self.is_open() {
            return MenuEvent::None;
        }
        match key.code {
            KeyCode::Escape => self.close(true),
            KeyCode::Tab | KeyCode::BackTab => {
                self.close(false);
                // Let the host move focus normally.
                MenuEvent::None
            }
            _ if key.code == KeyCode::Enter || (key.is_activation() && !self.is_typing(now)) => {
                match self.roving.active().cloned() {
                    Some(active) => self.activate(&active),
                    None => MenuEvent::Handled,
                }
            }
            _ => match self.roving.handle_key(key, now) {
                Some(_) => MenuEvent::Handled,
                None => MenuEvent::None,
            },
        }
    }
}

/// Owner of a popup menu.
pub struct Menu<K> {
    scope: Scope<MenuState<K>>,
}

impl<K: fmt::Debug> fmt::Debug for Menu<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Menu").field(&self.scope).finish()
    }
}

/// Roving settings menus use unless told otherwise: vertical, wrapping,
/// with typeahead.
#[must_use]
pub fn menu_config() -> RovingConfig {
    RovingConfig::new()
        .with_orientation(Orientation::Vertical)
        .with_typeahead(TypeaheadConfig::default())
}

impl<K: Clone + PartialEq + 'static> Menu<K> {
    /// Create a menu opened by `trigger` and rendered into `content`.
    #[must_use]
    pub fn new(
        env: SharedEnvironment,
        trigger: ElementId,
        content: ElementId,
        open: Controllable<bool>,
        config: RovingConfig,
    ) -> Self {
        let roving = RovingSet::new(env.clone(), config, Controllable::uncontrolled(None));
        Self {
            scope: Scope::new(MenuState {
                env,
                trigger,
                content,
                roving,
                open,
                outside: ClickOutside::new(content).with_boundary(trigger),
                pending_focus: None,
                on_select: None,
            }),
        }
    }

    /// Called with the key of every activated item.
    #[must_use]
    pub fn on_select(self, f: impl FnMut(&K) + 'static) -> Self {
        self.scope.with_mut(|s| s.on_select = Some(Box::new(f)));
        self
    }

    /// The handle to pass to every [`MenuItem`].
    #[must_use]
    pub fn scope(&self) -> Scope<MenuState<K>> {
        self.scope.clone()
    }

    /// Whether the menu is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.scope.with(MenuState::is_open)
    }

    /// The highlighted item.
    #[must_use]
    pub fn active(&self) -> Option<K> {
        self.scope.with(|s| s.roving.active().cloned())
    }

    /// Open and focus the first enabled item.
    pub fn open(&self) -> MenuEvent<K> {
        self.scope.with_mut(|s| s.open_with(NavCommand::First))
    }

    /// Close, optionally returning focus to the trigger.
    pub fn close(&self, restore_focus: bool) -> MenuEvent<K> {
        self.scope.with_mut(|s| s.close(restore_focus))
    }

    /// Apply the owner's open flag (controlled mode).
    pub fn sync_open(&self, open: bool) -> MenuEvent<K> {
        self.scope.with_mut(|s| {
            let was_open = s.is_open();
            if !s.open.sync_external(open) || was_open == open {
                return MenuEvent::None;
            }
            if open {
                let command = s.pending_focus.take().unwrap_or(NavCommand::First);
                s.roving.navigate(command);
                MenuEvent::Opened
            } else {
                let restore = s.focus_within_content();
                s.after_close(restore);
                MenuEvent::Closed
            }
        })
    }

    /// Activate an item as if it were clicked.
    pub fn activate(&self, key: &K) -> MenuEvent<K> {
        self.scope.with_mut(|s| s.activate(key))
    }

    /// Key pressed while the trigger has focus.
    pub fn handle_trigger_key(&self, key: &KeyEvent) -> MenuEvent<K> {
        self.scope.with_mut(|s| s.trigger_key(key))
    }

    /// Key pressed while focus is inside the menu.
    pub fn handle_content_key(&self, key: &KeyEvent, now: Instant) -> MenuEvent<K> {
        self.scope.with_mut(|s| s.content_key(key, now))
    }

    /// Route any input event, using the environment's focus to decide
    /// whether keys belong to the trigger or the menu.
    ///
    /// Focus events are ignored without touching the menu's state, so an
    /// adapter that fires `FocusIn` from inside [`Environment::focus`] may
    /// route it here.
    ///
    /// [`Environment::focus`]: faria_core::environment::Environment::focus
    pub fn handle_event(&self, event: &Event, now: Instant) -> MenuEvent<K> {
        if matches!(event, Event::FocusIn(_) | Event::FocusOut(_)) {
            return MenuEvent::None;
        }
        self.scope.with_mut(|s| match event {
            Event::Key(_) => {
                let Some(key) = event.key_press() else {
                    return MenuEvent::None;
                };
                let focused = s.env.active_element();
                if s.is_open() && s.focus_within_content() {
                    s.content_key(key, now)
                } else if focused.is_some_and(|el| s.env.contains(s.trigger, el)) {
                    s.trigger_key(key)
                } else {
                    MenuEvent::None
                }
            }
            Event::Pointer(pointer) => {
                if !s.is_open() {
                    return if pointer.is_down() && s.env.contains(s.trigger, pointer.target) {
                        s.open_with(NavCommand::First)
                    } else {
                        MenuEvent::None
                    };
                }
                if s.outside.handle_pointer(&*s.env, pointer) {
                    return s.close(false);
                }
                if pointer.is_down() && s.env.contains(s.trigger, pointer.target) {
                    return s.close(true);
                }
                let Some(key) = s.roving.key_for_element(pointer.target).cloned() else {
                    return MenuEvent::None;
                };
                match pointer.kind {
                    PointerEventKind::Down(_) => s.activate(&key),
                    PointerEventKind::Enter if s.roving.select(&key) => MenuEvent::Handled,
                    _ => MenuEvent::None,
                }
            }
            Event::FocusIn(_) | Event::FocusOut(_) => MenuEvent::None,
        })
    }

    /// Attributes for the trigger button.
    #[must_use]
    pub fn trigger_attrs(&self) -> AriaAttrs {
        self.scope.with(|s| {
            AriaAttrs::new()
                .id(dom_id(s.trigger, "menu-trigger"))
                .has_popup("menu")
                .expanded(s.is_open())
                .controls(dom_id(s.content, "menu"))
        })
    }

    /// Attributes for the menu container.
    #[must_use]
    pub fn content_attrs(&self) -> AriaAttrs {
        self.scope.with(|s| {
            AriaAttrs::new()
                .role("menu")
                .id(dom_id(s.content, "menu"))
                .labelled_by(dom_id(s.trigger, "menu-trigger"))
                .orientation(s.roving.config().orientation.as_str())
                .tab_index(-1)
        })
    }
}

/// One menu entry.
pub struct MenuItem<K: Clone + PartialEq> {
    scope: Scope<MenuState<K>>,
    key: K,
}

impl<K: Clone + PartialEq + fmt::Debug> fmt::Debug for MenuItem<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem").field("key", &self.key).finish()
    }
}

impl<K: Clone + PartialEq> MenuItem<K> {
    /// Mount an item, registering it with its menu.
    pub fn try_mount(
        scope: Option<&Scope<MenuState<K>>>,
        key: K,
        element: ElementId,
        label: impl Into<String>,
    ) -> Result<Self, UsageError> {
        let scope = Scope::try_consume(scope, "MenuItem", "Menu")?;
        scope.with_mut(|s| s.roving.acquire(key.clone(), RovingItem::new(element, label)));
        Ok(Self { scope, key })
    }

    /// Mount an item.
    ///
    /// # Panics
    ///
    /// Panics if `scope` is `None` (item rendered outside [`Menu`]).
    #[must_use]
    pub fn mount(
        scope: Option<&Scope<MenuState<K>>>,
        key: K,
        element: ElementId,
        label: impl Into<String>,
    ) -> Self {
        match Self::try_mount(scope, key, element, label) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }

    /// Toggle the disabled flag.
    pub fn set_disabled(&self, disabled: bool) {
        self.scope
            .with_mut(|s| s.roving.set_disabled(&self.key, disabled));
    }

    /// Whether this item is highlighted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scope.with(|s| s.roving.is_active(&self.key))
    }

    /// Attributes for the item element.
    #[must_use]
    pub fn attrs(&self) -> AriaAttrs {
        self.scope.with(|s| {
            let disabled = s.roving.item(&self.key).is_some_and(|i| i.disabled);
            AriaAttrs::new()
                .role("menuitem")
                .tab_index(-1)
                .disabled(disabled)
        })
    }
}

impl<K: Clone + PartialEq> Drop for MenuItem<K> {
    fn drop(&mut self) {
        self.scope.with_mut(|s| s.roving.release(&self.key));
    }
}
