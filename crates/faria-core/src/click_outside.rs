#![forbid(unsafe_code)]

//! Pointer-event boundary watcher.
//!
//! A [`ClickOutside`] holds one or more boundary elements (a popup and the
//! button that opened it, say) and reports pointer presses that land outside
//! all of them.
//!
//! # Failure Modes
//!
//! - A press on an element that is no longer attached (removed by its own
//!   click handler) is not reported: there is no way to tell where it was.
//! - With no boundaries registered, nothing is ever reported.

use crate::element::ElementId;
use crate::environment::Environment;
use crate::event::{Event, PointerEvent};

/// Reports pointer presses outside a set of boundary elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickOutside {
    boundaries: Vec<ElementId>,
    enabled: bool,
}

impl ClickOutside {
    /// Watch a single boundary.
    #[must_use]
    pub fn new(boundary: ElementId) -> Self {
        Self {
            boundaries: vec![boundary],
            enabled: true,
        }
    }

    /// Add another boundary; presses inside it are not "outside" either.
    #[must_use]
    pub fn with_boundary(mut self, boundary: ElementId) -> Self {
        self.add_boundary(boundary);
        self
    }

    /// Add a boundary to a live watcher.
    pub fn add_boundary(&mut self, boundary: ElementId) {
        if !self.boundaries.contains(&boundary) {
            self.boundaries.push(boundary);
        }
    }

    /// Remove a boundary.
    pub fn remove_boundary(&mut self, boundary: ElementId) {
        self.boundaries.retain(|&b| b != boundary);
    }

    /// The watched boundaries.
    #[must_use]
    pub fn boundaries(&self) -> &[ElementId] {
        &self.boundaries
    }

    /// Start or stop reporting.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the watcher reports presses.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `target` lies outside every boundary.
    #[must_use]
    pub fn is_outside(&self, env: &dyn Environment, target: ElementId) -> bool {
        if self.boundaries.is_empty() || !env.is_attached(target) {
            return false;
        }
        !self
            .boundaries
            .iter()
            .any(|&boundary| env.contains(boundary, target))
    }

    /// Whether `pointer` is a press outside every boundary.
    #[must_use]
    pub fn handle_pointer(&self, env: &dyn Environment, pointer: &PointerEvent) -> bool {
        self.enabled && pointer.is_down() && self.is_outside(env, pointer.target)
    }

    /// Whether `event` is a pointer press outside every boundary.
    #[must_use]
    pub fn handle_event(&self, env: &dyn Environment, event: &Event) -> bool {
        event
            .pointer()
            .is_some_and(|pointer| self.handle_pointer(env, pointer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementInfo;
    use crate::testing::TestEnvironment;

    #[test]
    fn reports_presses_outside_all_boundaries() {
        let env = TestEnvironment::new();
        let trigger = env.append(env.root(), ElementInfo::button());
        let popup = env.append(env.root(), ElementInfo::generic());
        let item = env.append(popup, ElementInfo::button());
        let elsewhere = env.append(env.root(), ElementInfo::button());

        let watcher = ClickOutside::new(popup).with_boundary(trigger);
        assert!(!watcher.handle_pointer(&*env, &PointerEvent::down(item)));
        assert!(!watcher.handle_pointer(&*env, &PointerEvent::down(trigger)));
        assert!(watcher.handle_pointer(&*env, &PointerEvent::down(elsewhere)));
    }

    #[test]
    fn ignores_non_press_events() {
        let env = TestEnvironment::new();
        let popup = env.append(env.root(), ElementInfo::generic());
        let elsewhere = env.append(env.root(), ElementInfo::button());
        let watcher = ClickOutside::new(popup);
        assert!(!watcher.handle_pointer(&*env, &PointerEvent::enter(elsewhere)));
        assert!(!watcher.handle_event(&*env, &Event::FocusIn(elsewhere)));
    }

    #[test]
    fn disabled_watcher_is_silent() {
        let env = TestEnvironment::new();
        let popup = env.append(env.root(), ElementInfo::generic());
        let elsewhere = env.append(env.root(), ElementInfo::button());
        let mut watcher = ClickOutside::new(popup);
        watcher.set_enabled(false);
        assert!(!watcher.handle_pointer(&*env, &PointerEvent::down(elsewhere)));
    }

    #[test]
    fn detached_targets_are_not_outside() {
        let env = TestEnvironment::new();
        let popup = env.append(env.root(), ElementInfo::generic());
        let removed = env.append(env.root(), ElementInfo::button());
        env.detach(removed);
        let watcher = ClickOutside::new(popup);
        assert!(!watcher.is_outside(&*env, removed));
    }

    #[test]
    fn boundaries_are_deduplicated() {
        let a = ElementId::from_raw(1);
        let mut watcher = ClickOutside::new(a).with_boundary(a);
        assert_eq!(watcher.boundaries(), &[a]);
        watcher.remove_boundary(a);
        assert!(watcher.boundaries().is_empty());
    }
}
