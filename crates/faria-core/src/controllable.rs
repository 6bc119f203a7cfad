#![forbid(unsafe_code)]

//! Dual-mode ("controlled" / "uncontrolled") state cell.
//!
//! Every stateful primitive keeps its user-visible state (selected tab, open
//! flag, active menu item) in a [`Controllable`]. The cell decides once, at
//! construction, who owns the authoritative value:
//!
//! - **Controlled**: an external value was supplied. Reads always return it;
//!   [`Controllable::set`] only reports the requested value through the
//!   change callback. The owner applies it later with
//!   [`Controllable::sync_external`].
//! - **Uncontrolled**: no external value. The cell stores the value itself
//!   and still reports every change through the callback, so a parent can
//!   observe without owning.
//!
//! # Invariants
//!
//! 1. The mode is fixed for the lifetime of the cell.
//! 2. Every `set`/`update` call invokes the change callback exactly once,
//!    even when the value is unchanged.
//! 3. `update` resolves its closure against the current *read* value (the
//!    external value in controlled mode).
//!
//! # Example
//!
//! ```
//! use faria_core::controllable::Controllable;
//!
//! let mut open = Controllable::uncontrolled(false);
//! open.set(true);
//! assert!(*open.get());
//!
//! let mut tab = Controllable::controlled("first");
//! tab.set("second");
//! assert_eq!(*tab.get(), "first");
//! ```

use std::fmt;

/// Who owns the authoritative value of a [`Controllable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    /// The value lives with an external owner.
    Controlled,
    /// The cell owns its value.
    Uncontrolled,
}

type ChangeFn<T> = Box<dyn FnMut(&T)>;

/// Dual-mode state cell.
pub struct Controllable<T> {
    mode: ControlMode,
    external: Option<T>,
    internal: T,
    on_change: Option<ChangeFn<T>>,
}

impl<T: fmt::Debug> fmt::Debug for Controllable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controllable")
            .field("mode", &self.mode)
            .field("value", self.get())
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

impl<T> Controllable<T> {
    /// Create a cell from an optional external value and a default.
    ///
    /// `Some(external)` makes the cell controlled; `None` makes it
    /// uncontrolled, starting at `default`.
    #[must_use]
    pub fn new(external: Option<T>, default: T) -> Self {
        let mode = if external.is_some() {
            ControlMode::Controlled
        } else {
            ControlMode::Uncontrolled
        };
        Self {
            mode,
            external,
            internal: default,
            on_change: None,
        }
    }

    /// Attach the change callback.
    #[must_use]
    pub fn on_change(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Replace the change callback on an existing cell.
    pub fn set_on_change(&mut self, f: impl FnMut(&T) + 'static) {
        self.on_change = Some(Box::new(f));
    }

    /// The ownership mode fixed at construction.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Whether an external owner holds the value.
    #[inline]
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.mode == ControlMode::Controlled
    }

    /// The authoritative value.
    #[must_use]
    pub fn get(&self) -> &T {
        match (&self.mode, &self.external) {
            (ControlMode::Controlled, Some(external)) => external,
            _ => &self.internal,
        }
    }

    /// Request a new value.
    ///
    /// Uncontrolled cells store it; controlled cells leave their value alone.
    /// Either way the change callback receives `next`.
    pub fn set(&mut self, next: T) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&next);
        }
        if self.mode == ControlMode::Uncontrolled {
            self.internal = next;
        }
    }

    /// Request a value computed from the current one.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(self.get());
        self.set(next);
    }

    /// Apply a new value from the external owner.
    ///
    /// This is how a controlled cell's value changes. On an uncontrolled
    /// cell it would switch modes mid-life, which is not supported: the
    /// call is ignored and `false` is returned. The change callback is not
    /// invoked, since the owner already knows the value.
    pub fn sync_external(&mut self, value: T) -> bool {
        match self.mode {
            ControlMode::Controlled => {
                self.external = Some(value);
                true
            }
            ControlMode::Uncontrolled => {
                crate::warn!("ignoring external value for an uncontrolled cell");
                false
            }
        }
    }
}

impl<T: Clone> Controllable<T> {
    /// Create a controlled cell. `value` doubles as the unused default.
    #[must_use]
    pub fn controlled(value: T) -> Self {
        Self::new(Some(value.clone()), value)
    }
}

impl<T> Controllable<T> {
    /// Create an uncontrolled cell starting at `default`.
    #[must_use]
    pub fn uncontrolled(default: T) -> Self {
        Self::new(None, default)
    }
}

impl<T: Default> Default for Controllable<T> {
    fn default() -> Self {
        Self::uncontrolled(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn controlled_set_reports_but_keeps_external() {
        let (log, sink) = recorder::<i32>();
        let mut cell = Controllable::new(Some(1), 0).on_change(sink);
        assert!(cell.is_controlled());

        cell.set(5);
        assert_eq!(*cell.get(), 1);
        assert_eq!(*log.borrow(), vec![5]);
    }

    #[test]
    fn uncontrolled_set_stores_and_reports() {
        let (log, sink) = recorder::<i32>();
        let mut cell = Controllable::new(None, 0).on_change(sink);
        assert_eq!(cell.mode(), ControlMode::Uncontrolled);

        cell.set(5);
        assert_eq!(*cell.get(), 5);
        assert_eq!(*log.borrow(), vec![5]);
    }

    #[test]
    fn uncontrolled_without_callback() {
        let mut cell = Controllable::uncontrolled(String::from("a"));
        cell.set("b".into());
        assert_eq!(cell.get(), "b");
    }

    #[test]
    fn update_resolves_against_read_value() {
        let (log, sink) = recorder::<i32>();
        let mut cell = Controllable::new(Some(10), 0).on_change(sink);
        cell.update(|v| v + 1);
        cell.update(|v| v + 1);
        // Controlled: both updates computed from the external 10.
        assert_eq!(*log.borrow(), vec![11, 11]);

        let mut local = Controllable::uncontrolled(10);
        local.update(|v| v + 1);
        local.update(|v| v + 1);
        assert_eq!(*local.get(), 12);
    }

    #[test]
    fn callback_fires_even_when_unchanged() {
        let (log, sink) = recorder::<bool>();
        let mut cell = Controllable::uncontrolled(false).on_change(sink);
        cell.set(false);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn sync_external_moves_controlled_value() {
        let (log, sink) = recorder::<i32>();
        let mut cell = Controllable::controlled(1).on_change(sink);
        assert!(cell.sync_external(2));
        assert_eq!(*cell.get(), 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn sync_external_cannot_switch_modes() {
        let mut cell = Controllable::uncontrolled(1);
        assert!(!cell.sync_external(2));
        assert_eq!(*cell.get(), 1);
        assert!(!cell.is_controlled());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn controlled_reads_never_move(
                external in any::<i32>(),
                sets in proptest::collection::vec(any::<i32>(), 0..16),
            ) {
                let (log, sink) = recorder::<i32>();
                let mut cell = Controllable::controlled(external).on_change(sink);
                for v in &sets {
                    cell.set(*v);
                    prop_assert_eq!(*cell.get(), external);
                }
                prop_assert_eq!(&*log.borrow(), &sets);
            }

            #[test]
            fn uncontrolled_reads_last_set(
                default in any::<i32>(),
                sets in proptest::collection::vec(any::<i32>(), 1..16),
            ) {
                let mut cell = Controllable::uncontrolled(default);
                for v in &sets {
                    cell.set(*v);
                }
                prop_assert_eq!(*cell.get(), *sets.last().unwrap());
            }
        }
    }
}
