#![forbid(unsafe_code)]

//! Tab strip: a roving tablist wired to its panels.
//!
//! [`Tabs`] owns the shared state; [`Tab`] and [`TabPanel`] are mounted with
//! the owner's [`Scope`] and register themselves under a key. Selection
//! follows focus (automatic activation): arrow keys, Home/End and pointer
//! presses select a tab and move focus to it.
//!
//! ```ignore
//! let tabs = Tabs::new(env, list_el, Controllable::uncontrolled(None), RovingConfig::default());
//! let general = Tab::mount(Some(&tabs.scope()), "general", tab_el, "General");
//! let panel = TabPanel::mount(Some(&tabs.scope()), "general", panel_el);
//! assert_eq!(panel.attrs().get("aria-labelledby"), general.attrs().get("id"));
//! ```
//!
//! # Failure Modes
//!
//! - The selection change callback of the [`Controllable`] runs while the
//!   strip's state is borrowed (from [`Tabs::select`], key and pointer
//!   handling); calling back into the same strip from it panics with a
//!   `RefCell` borrow error. Focus events routed to [`Tabs::handle_event`]
//!   from inside `Environment::focus` are ignored without borrowing.

use std::fmt;

use faria_core::controllable::Controllable;
use faria_core::element::ElementId;
use faria_core::environment::SharedEnvironment;
use faria_core::error::UsageError;
use faria_core::event::{Event, KeyEvent};
use faria_core::registry::Registry;
use faria_core::scope::Scope;
use web_time::Instant;

use crate::aria::{AriaAttrs, dom_id};
use crate::roving::{RovingConfig, RovingItem, RovingSet};

/// Shared state of one tab strip.
pub struct TabsState<K> {
    roving: RovingSet<K>,
    panels: Registry<K, ElementId>,
}

impl<K: fmt::Debug> fmt::Debug for TabsState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsState")
            .field("roving", &self.roving)
            .field("panels", &self.panels)
            .finish()
    }
}

impl<K: Clone + PartialEq> TabsState<K> {
    fn tab_id(&self, key: &K) -> Option<String> {
        self.roving.item(key).map(|item| dom_id(item.element, "tab"))
    }

    fn panel_id(&self, key: &K) -> Option<String> {
        self.panels.get(key).map(|&el| dom_id(el, "tabpanel"))
    }

    /// The selected tab, or the first enabled one when nothing is selected.
    fn shown(&self) -> Option<&K> {
        self.roving.tab_stop()
    }
}

/// Owner of a tab strip.
pub struct Tabs<K> {
    scope: Scope<TabsState<K>>,
    list: ElementId,
}

impl<K: fmt::Debug> fmt::Debug for Tabs<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tabs")
            .field("list", &self.list)
            .field("state", &self.scope)
            .finish()
    }
}

impl<K: Clone + PartialEq + 'static> Tabs<K> {
    /// Create a tab strip on the `tablist` element `list`.
    #[must_use]
    pub fn new(
        env: SharedEnvironment,
        list: ElementId,
        selected: Controllable<Option<K>>,
        config: RovingConfig,
    ) -> Self {
        Self {
            scope: Scope::new(TabsState {
                roving: RovingSet::new(env, config, selected),
                panels: Registry::new(),
            }),
            list,
        }
    }

    /// The handle to pass to every [`Tab`] and [`TabPanel`].
    #[must_use]
    pub fn scope(&self) -> Scope<TabsState<K>> {
        self.scope.clone()
    }

    /// The selected tab. When nothing is selected (or the selection is
    /// stale) the first enabled tab is shown.
    #[must_use]
    pub fn selected(&self) -> Option<K> {
        self.scope.with(|s| s.shown().cloned())
    }

    /// Select a tab by key.
    pub fn select(&self, key: &K) -> bool {
        self.scope.with_mut(|s| s.roving.select(key))
    }

    /// Apply the owner's selection (controlled mode).
    pub fn sync_selected(&self, key: Option<K>) -> bool {
        self.scope.with_mut(|s| s.roving.sync_active(key))
    }

    /// Arrow keys, Home/End. Returns the newly selected tab.
    pub fn handle_key(&self, key: &KeyEvent, now: Instant) -> Option<K> {
        self.scope.with_mut(|s| s.roving.handle_key(key, now))
    }

    /// Keyboard or pointer input aimed at the tab list.
    pub fn handle_event(&self, event: &Event, now: Instant) -> Option<K> {
        match event {
            Event::Pointer(pointer) => self.scope.with_mut(|s| s.roving.handle_pointer(pointer)),
            _ => event.key_press().and_then(|key| self.handle_key(key, now)),
        }
    }

    /// Attributes for the `tablist` element.
    #[must_use]
    pub fn attrs(&self) -> AriaAttrs {
        let orientation = self.scope.with(|s| s.roving.config().orientation);
        AriaAttrs::new()
            .role("tablist")
            .orientation(orientation.as_str())
    }
}

impl<K: Clone + PartialEq + fmt::Debug + 'static> Tabs<K> {
    /// Select a tab that must exist.
    pub fn try_select(&self, key: &K) -> Result<bool, UsageError> {
        self.scope.with_mut(|s| s.roving.try_select(key, "Tabs"))
    }
}

/// One tab button.
pub struct Tab<K: Clone + PartialEq> {
    scope: Scope<TabsState<K>>,
    key: K,
    element: ElementId,
}

impl<K: Clone + PartialEq + fmt::Debug> fmt::Debug for Tab<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("key", &self.key)
            .field("element", &self.element)
            .finish()
    }
}

impl<K: Clone + PartialEq> Tab<K> {
    /// Mount a tab, registering it with its strip.
    pub fn try_mount(
        scope: Option<&Scope<TabsState<K>>>,
        key: K,
        element: ElementId,
        label: impl Into<String>,
    ) -> Result<Self, UsageError> {
        let scope = Scope::try_consume(scope, "Tab", "Tabs")?;
        scope.with_mut(|s| s.roving.acquire(key.clone(), RovingItem::new(element, label)));
        Ok(Self {
            scope,
            key,
            element,
        })
    }

    /// Mount a tab.
    ///
    /// # Panics
    ///
    /// Panics if `scope` is `None` (tab rendered outside [`Tabs`]).
    #[must_use]
    pub fn mount(
        scope: Option<&Scope<TabsState<K>>>,
        key: K,
        element: ElementId,
        label: impl Into<String>,
    ) -> Self {
        match Self::try_mount(scope, key, element, label) {
            Ok(tab) => tab,
            Err(err) => panic!("{err}"),
        }
    }

    /// This tab's key.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Whether this tab is shown.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.scope.with(|s| s.shown() == Some(&self.key))
    }

    /// Toggle the disabled flag.
    pub fn set_disabled(&self, disabled: bool) {
        self.scope
            .with_mut(|s| s.roving.set_disabled(&self.key, disabled));
    }

    /// Attributes for the tab element.
    #[must_use]
    pub fn attrs(&self) -> AriaAttrs {
        self.scope.with(|s| {
            let selected = s.shown() == Some(&self.key);
            let disabled = s.roving.item(&self.key).is_some_and(|i| i.disabled);
            let attrs = AriaAttrs::new()
                .role("tab")
                .id(dom_id(self.element, "tab"))
                .selected(selected)
                .tab_index(s.roving.tab_index(&self.key))
                .disabled(disabled);
            match s.panel_id(&self.key) {
                Some(panel) => attrs.controls(panel),
                None => attrs,
            }
        })
    }
}

impl<K: Clone + PartialEq> Drop for Tab<K> {
    fn drop(&mut self) {
        self.scope.with_mut(|s| s.roving.release(&self.key));
    }
}

/// The panel shown for one tab.
pub struct TabPanel<K: Clone + PartialEq> {
    scope: Scope<TabsState<K>>,
    key: K,
    element: ElementId,
}

impl<K: Clone + PartialEq + fmt::Debug> fmt::Debug for TabPanel<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabPanel")
            .field("key", &self.key)
            .field("element", &self.element)
            .finish()
    }
}

impl<K: Clone + PartialEq> TabPanel<K> {
    /// Mount a panel for `key`.
    pub fn try_mount(
        scope: Option<&Scope<TabsState<K>>>,
        key: K,
        element: ElementId,
    ) -> Result<Self, UsageError> {
        let scope = Scope::try_consume(scope, "TabPanel", "Tabs")?;
        scope.with_mut(|s| s.panels.acquire(key.clone(), element));
        Ok(Self {
            scope,
            key,
            element,
        })
    }

    /// Mount a panel.
    ///
    /// # Panics
    ///
    /// Panics if `scope` is `None` (panel rendered outside [`Tabs`]).
    #[must_use]
    pub fn mount(scope: Option<&Scope<TabsState<K>>>, key: K, element: ElementId) -> Self {
        match Self::try_mount(scope, key, element) {
            Ok(panel) => panel,
            Err(err) => panic!("{err}"),
        }
    }

    /// Whether the panel should be hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.scope.with(|s| s.shown() != Some(&self.key))
    }

    /// Attributes for the panel element.
    #[must_use]
    pub fn attrs(&self) -> AriaAttrs {
        self.scope.with(|s| {
            let attrs = AriaAttrs::new()
                .role("tabpanel")
                .id(dom_id(self.element, "tabpanel"))
                .tab_index(0);
            match s.tab_id(&self.key) {
                Some(tab) => attrs.labelled_by(tab),
                None => attrs,
            }
        })
    }
}

impl<K: Clone + PartialEq> Drop for TabPanel<K> {
    fn drop(&mut self) {
        self.scope.with_mut(|s| s.panels.release(&self.key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faria_core::element::ElementInfo;
    use faria_core::environment::Environment;
    use faria_core::event::{KeyCode, PointerEvent};
    use faria_core::testing::TestEnvironment;
    use std::rc::Rc;

    struct Strip {
        env: Rc<TestEnvironment>,
        tabs: Tabs<&'static str>,
        tab_els: Vec<ElementId>,
        mounted: Vec<Tab<&'static str>>,
        panels: Vec<TabPanel<&'static str>>,
    }

    fn strip(selected: Controllable<Option<&'static str>>) -> Strip {
        let env = TestEnvironment::new();
        let list = env.append(env.root(), ElementInfo::generic());
        let tabs = Tabs::new(env.shared(), list, selected, RovingConfig::default());
        let scope = tabs.scope();
        let mut tab_els = Vec::new();
        let mut mounted = Vec::new();
        let mut panels = Vec::new();
        for key in ["one", "two", "three"] {
            let el = env.append(list, ElementInfo::button());
            let panel_el = env.append(env.root(), ElementInfo::generic());
            mounted.push(Tab::mount(Some(&scope), key, el, key));
            panels.push(TabPanel::mount(Some(&scope), key, panel_el));
            tab_els.push(el);
        }
        Strip {
            env,
            tabs,
            tab_els,
            mounted,
            panels,
        }
    }

    #[test]
    fn first_tab_shown_by_default() {
        let s = strip(Controllable::uncontrolled(None));
        assert_eq!(s.tabs.selected(), Some("one"));
        assert!(s.mounted[0].is_selected());
        assert!(!s.panels[0].is_hidden());
        assert!(s.panels[1].is_hidden());
    }

    #[test]
    fn arrows_select_and_focus() {
        let s = strip(Controllable::uncontrolled(Some("one")));
        let now = Instant::now();
        assert_eq!(s.tabs.handle_key(&KeyEvent::new(KeyCode::Right), now), Some("two"));
        assert_eq!(s.env.active_element(), Some(s.tab_els[1]));
        assert_eq!(s.tabs.handle_key(&KeyEvent::new(KeyCode::Left), now), Some("one"));
        assert_eq!(s.tabs.handle_key(&KeyEvent::new(KeyCode::Left), now), Some("three"));
        assert!(s.panels[1].is_hidden());
        assert!(!s.panels[2].is_hidden());
    }

    #[test]
    fn aria_wiring_between_tab_and_panel() {
        let s = strip(Controllable::uncontrolled(Some("two")));
        let tab = s.mounted[1].attrs();
        let panel = s.panels[1].attrs();
        assert_eq!(tab.get("role"), Some("tab"));
        assert_eq!(tab.get("aria-selected"), Some("true"));
        assert_eq!(tab.get("tabindex"), Some("0"));
        assert_eq!(tab.get("aria-controls"), panel.get("id"));
        assert_eq!(panel.get("aria-labelledby"), tab.get("id"));
        assert_eq!(s.mounted[0].attrs().get("tabindex"), Some("-1"));
        assert_eq!(s.tabs.attrs().get("aria-orientation"), Some("horizontal"));
    }

    #[test]
    fn disabled_tab_is_skipped() {
        let s = strip(Controllable::uncontrolled(Some("one")));
        s.mounted[1].set_disabled(true);
        let now = Instant::now();
        assert_eq!(s.tabs.handle_key(&KeyEvent::new(KeyCode::Right), now), Some("three"));
        assert_eq!(s.mounted[1].attrs().get("aria-disabled"), Some("true"));
    }

    #[test]
    fn pointer_selects_tab() {
        let s = strip(Controllable::uncontrolled(None));
        let ev = Event::Pointer(PointerEvent::down(s.tab_els[2]));
        assert_eq!(s.tabs.handle_event(&ev, Instant::now()), Some("three"));
    }

    #[test]
    fn unmounted_tab_unregisters() {
        let mut s = strip(Controllable::uncontrolled(Some("three")));
        s.mounted.pop();
        assert_eq!(s.tabs.selected(), Some("one"));
        assert!(s.panels[2].attrs().get("aria-labelledby").is_none());
    }

    #[test]
    fn remounted_tab_survives_first_unmount() {
        let mut s = strip(Controllable::uncontrolled(Some("three")));
        let scope = s.tabs.scope();
        let second = Tab::mount(Some(&scope), "three", s.tab_els[2], "three");
        let panel_el = s.env.append(s.env.root(), ElementInfo::generic());
        let panel = TabPanel::mount(Some(&scope), "three", panel_el);
        let controls = second.attrs().get("aria-controls").map(str::to_string);
        s.mounted.pop();
        s.panels.pop();
        assert_eq!(s.tabs.selected(), Some("three"));
        assert!(second.is_selected());
        assert!(!panel.is_hidden());
        assert_eq!(second.attrs().get("aria-controls"), controls.as_deref());
        assert!(controls.is_some());

        drop(second);
        assert_eq!(s.tabs.selected(), Some("one"));
    }

    #[test]
    fn controlled_selection_waits_for_owner() {
        let s = strip(Controllable::controlled(Some("one")));
        assert!(s.tabs.select(&"two"));
        assert_eq!(s.tabs.selected(), Some("one"));
        assert!(s.tabs.sync_selected(Some("two")));
        assert_eq!(s.tabs.selected(), Some("two"));
    }

    #[test]
    fn try_select_unknown_tab() {
        let s = strip(Controllable::uncontrolled(None));
        assert!(s.tabs.try_select(&"nine").is_err());
    }

    #[test]
    fn mounting_outside_tabs_is_reported() {
        let err = Tab::<u8>::try_mount(None, 1, ElementId::from_raw(9), "x").unwrap_err();
        assert_eq!(err.to_string(), "`Tab` must be used within `Tabs`");
    }

    #[test]
    #[should_panic(expected = "`TabPanel` must be used within `Tabs`")]
    fn panel_outside_tabs_panics() {
        let _ = TabPanel::<u8>::mount(None, 1, ElementId::from_raw(9));
    }
}
