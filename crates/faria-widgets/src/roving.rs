#![forbid(unsafe_code)]

//! Roving focus over an ordered, mutually exclusive item set.
//!
//! A [`RovingSet`] is the shared navigation engine behind tab strips and
//! menus. Items register as they mount (in order); one of them is the
//! *active* item, held in a [`Controllable`] so either the set or its owner
//! can own the selection. Exactly one item is the tab stop (`tabindex=0`);
//! the rest are reachable only through arrow keys, Home/End, typeahead or
//! the pointer.
//!
//! # Invariants
//!
//! - The active key reported by [`RovingSet::active`] is always a registered
//!   key; a stale value left behind by an unregistered item reads as `None`.
//! - Selecting an item moves host focus to its element (focus follows
//!   selection).
//! - Disabled items are never selected by navigation or typeahead. If every
//!   item is disabled, navigation does nothing.
//!
//! # Evidence Ledger
//!
//! With `i` the active position (`-1` when nothing is active) and `n` the
//! item count, the wrapping decision rule is:
//!
//! - previous: `i > 0 ? i - 1 : n - 1`
//! - next: `i < n - 1 ? i + 1 : 0`
//! - first: `0`, last: `n - 1`
//!
//! When the landing item is disabled, the walk continues in the same
//! direction until an enabled item is found or every item has been visited.

use std::fmt;

use faria_core::controllable::Controllable;
use faria_core::element::ElementId;
use faria_core::environment::SharedEnvironment;
use faria_core::error::UsageError;
use faria_core::event::{KeyCode, KeyEvent, PointerEvent};
use faria_core::registry::Registry;
use web_time::Instant;

use crate::typeahead::{Typeahead, TypeaheadConfig};

/// A navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    /// Previous item.
    Prev,
    /// Next item.
    Next,
    /// First item.
    First,
    /// Last item.
    Last,
}

/// Which arrow keys drive the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Left/Right.
    #[default]
    Horizontal,
    /// Up/Down.
    Vertical,
    /// Both axes.
    Both,
}

impl Orientation {
    /// The `aria-orientation` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal | Self::Both => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    /// Map an arrow key to a command, if this orientation uses it.
    #[must_use]
    pub fn command_for(self, code: KeyCode) -> Option<NavCommand> {
        let horizontal = matches!(self, Self::Horizontal | Self::Both);
        let vertical = matches!(self, Self::Vertical | Self::Both);
        match code {
            KeyCode::Left if horizontal => Some(NavCommand::Prev),
            KeyCode::Right if horizontal => Some(NavCommand::Next),
            KeyCode::Up if vertical => Some(NavCommand::Prev),
            KeyCode::Down if vertical => Some(NavCommand::Next),
            KeyCode::Home => Some(NavCommand::First),
            KeyCode::End => Some(NavCommand::Last),
            _ => None,
        }
    }
}

/// Roving navigation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RovingConfig {
    /// Arrow-key axis.
    pub orientation: Orientation,
    /// Wrap from the last item to the first and back.
    pub wrap: bool,
    /// Typeahead settings; `None` disables typeahead.
    pub typeahead: Option<TypeaheadConfig>,
}

impl Default for RovingConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            wrap: true,
            typeahead: None,
        }
    }
}

impl RovingConfig {
    /// Default config: horizontal, wrapping, no typeahead.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the arrow-key axis.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Enable or disable wrapping.
    #[must_use]
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Enable typeahead.
    #[must_use]
    pub fn with_typeahead(mut self, config: TypeaheadConfig) -> Self {
        self.typeahead = Some(config);
        self
    }
}

/// A registered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RovingItem {
    /// Host element that receives focus.
    pub element: ElementId,
    /// Text matched by typeahead.
    pub label: String,
    /// Skipped by navigation and typeahead.
    pub disabled: bool,
}

impl RovingItem {
    /// An enabled item.
    #[must_use]
    pub fn new(element: ElementId, label: impl Into<String>) -> Self {
        Self {
            element,
            label: label.into(),
            disabled: false,
        }
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Ordered item set with one active item and roving tab stop.
pub struct RovingSet<K> {
    env: SharedEnvironment,
    config: RovingConfig,
    items: Registry<K, RovingItem>,
    active: Controllable<Option<K>>,
    typeahead: Option<Typeahead>,
}

impl<K: fmt::Debug> fmt::Debug for RovingSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RovingSet")
            .field("config", &self.config)
            .field("items", &self.items)
            .field("active", &self.active)
            .finish()
    }
}

impl<K: Clone + PartialEq> RovingSet<K> {
    /// Create an empty set. `active` decides who owns the selection.
    #[must_use]
    pub fn new(
        env: SharedEnvironment,
        config: RovingConfig,
        active: Controllable<Option<K>>,
    ) -> Self {
        Self {
            env,
            config,
            items: Registry::new(),
            active,
            typeahead: config.typeahead.map(Typeahead::new),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &RovingConfig {
        &self.config
    }

    /// Register an item at the end of the sequence. Returns `false` if the
    /// key is already registered.
    pub fn register(&mut self, key: K, item: RovingItem) -> bool {
        self.items.register(key, item)
    }

    /// Withdraw an item.
    pub fn unregister(&mut self, key: &K) -> Option<RovingItem> {
        self.items.unregister(key)
    }

    /// Register on behalf of a mounted item. A key that is already present
    /// keeps its item and gains a mount.
    pub fn acquire(&mut self, key: K, item: RovingItem) -> bool {
        self.items.acquire(key, item)
    }

    /// Release one mount; the item is withdrawn with its last mount.
    pub fn release(&mut self, key: &K) -> Option<RovingItem> {
        self.items.release(key)
    }

    /// Toggle an item's disabled flag.
    pub fn set_disabled(&mut self, key: &K, disabled: bool) -> bool {
        match self.items.get_mut(key) {
            Some(item) => {
                item.disabled = disabled;
                true
            }
            None => false,
        }
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item.
    #[must_use]
    pub fn item(&self, key: &K) -> Option<&RovingItem> {
        self.items.get(key)
    }

    /// Items in registration order.
    pub fn items(&self) -> impl Iterator<Item = (&K, &RovingItem)> {
        self.items.iter()
    }

    /// The active key, if it is registered.
    #[must_use]
    pub fn active(&self) -> Option<&K> {
        self.active
            .get()
            .as_ref()
            .filter(|key| self.items.contains(key))
    }

    /// Position of the active key.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active().and_then(|key| self.items.position(key))
    }

    /// Whether `key` is the active item.
    #[must_use]
    pub fn is_active(&self, key: &K) -> bool {
        self.active() == Some(key)
    }

    /// Apply a selection pushed by the owner of a controlled set.
    pub fn sync_active(&mut self, key: Option<K>) -> bool {
        self.active.sync_external(key)
    }

    /// The item that carries `tabindex=0`: the active item if it is enabled,
    /// otherwise the first enabled item.
    #[must_use]
    pub fn tab_stop(&self) -> Option<&K> {
        self.active()
            .filter(|key| self.items.get(key).is_some_and(|item| !item.disabled))
            .or_else(|| {
                self.items
                    .iter()
                    .find(|(_, item)| !item.disabled)
                    .map(|(key, _)| key)
            })
    }

    /// `0` for the tab stop, `-1` for everything else.
    #[must_use]
    pub fn tab_index(&self, key: &K) -> i32 {
        if self.tab_stop() == Some(key) { 0 } else { -1 }
    }

    fn enabled_at(&self, index: usize) -> bool {
        self.items
            .get_index(index)
            .is_some_and(|(_, item)| !item.disabled)
    }

    /// Where `command` would land, without moving.
    #[must_use]
    pub fn target(&self, command: NavCommand) -> Option<usize> {
        let n = self.items.len();
        if n == 0 {
            return None;
        }
        let last = n - 1;
        let current = self.active_index();

        let (start, forward) = match command {
            NavCommand::First => (0, true),
            NavCommand::Last => (last, false),
            NavCommand::Next => match current {
                Some(i) if i < last => (i + 1, true),
                Some(_) if !self.config.wrap => return None,
                _ => (0, true),
            },
            NavCommand::Prev => match current {
                Some(i) if i > 0 => (i - 1, false),
                Some(_) if !self.config.wrap => return None,
                _ => (last, false),
            },
        };

        let mut index = start;
        for _ in 0..n {
            if self.enabled_at(index) {
                return Some(index);
            }
            index = match (forward, self.config.wrap) {
                (true, _) if index < last => index + 1,
                (false, _) if index > 0 => index - 1,
                (true, true) => 0,
                (false, true) => last,
                (_, false) => return None,
            };
        }
        None
    }

    /// Move the selection. Returns the newly selected key.
    pub fn navigate(&mut self, command: NavCommand) -> Option<K> {
        let index = self.target(command)?;
        let key = self.items.get_index(index).map(|(key, _)| key.clone())?;
        self.select(&key).then_some(key)
    }

    /// Select `key` and focus its element. Returns `false` for unknown or
    /// disabled keys.
    pub fn select(&mut self, key: &K) -> bool {
        let Some(item) = self.items.get(key) else {
            return false;
        };
        if item.disabled {
            return false;
        }
        let element = item.element;
        self.active.set(Some(key.clone()));
        self.env.focus(element);
        true
    }

    /// Clear the selection.
    pub fn clear_active(&mut self) {
        self.active.set(None);
    }

    /// Typeahead: feed `ch` and select the first matching item.
    pub fn type_char(&mut self, ch: char, now: Instant) -> Option<K> {
        let typeahead = self.typeahead.as_mut()?;
        let index = typeahead.search(
            ch,
            now,
            self.items
                .values()
                .map(|item| (item.label.as_str(), item.disabled)),
        )?;
        let key = self.items.get_index(index).map(|(key, _)| key.clone())?;
        self.select(&key).then_some(key)
    }

    /// The typeahead state, if enabled.
    #[must_use]
    pub fn typeahead(&self) -> Option<&Typeahead> {
        self.typeahead.as_ref()
    }

    /// Handle a navigation key. Returns the newly selected key.
    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Option<K> {
        if let Some(command) = self.config.orientation.command_for(key.code) {
            return self.navigate(command);
        }
        key.printable().and_then(|ch| self.type_char(ch, now))
    }

    /// The key whose element is `element` or contains it.
    #[must_use]
    pub fn key_for_element(&self, element: ElementId) -> Option<&K> {
        self.items
            .iter()
            .find(|(_, item)| self.env.contains(item.element, element))
            .map(|(key, _)| key)
    }

    /// Select the item under a pointer press.
    pub fn handle_pointer(&mut self, pointer: &PointerEvent) -> Option<K> {
        if !pointer.is_down() {
            return None;
        }
        let key = self.key_for_element(pointer.target)?.clone();
        self.select(&key).then_some(key)
    }
}

impl<K: Clone + PartialEq + fmt::Debug> RovingSet<K> {
    /// Like [`RovingSet::select`], but an unknown key is a usage error.
    pub fn try_select(&mut self, key: &K, owner: &'static str) -> Result<bool, UsageError> {
        if !self.items.contains(key) {
            return Err(UsageError::NotRegistered {
                owner,
                key: format!("{key:?}"),
            });
        }
        Ok(self.select(key))
    }
}
