#![forbid(unsafe_code)]

//! Capability-scoped shared state.
//!
//! An owner (tab list, menu, form) creates a [`Scope`] and hands clones of
//! it to the components it encloses. Each owner instance gets its own
//! handle; there is no ambient global. A component mounted without a handle
//! is a wiring defect and fails immediately through [`Scope::consume`].
//!
//! # Example
//!
//! ```
//! use faria_core::scope::Scope;
//!
//! let owner = Scope::new(vec!["a", "b"]);
//! let child = Scope::consume(Some(&owner), "Item", "List");
//! child.with_mut(|items| items.push("c"));
//! assert_eq!(owner.with(|items| items.len()), 3);
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::UsageError;

/// Shared handle to one owner's state.
pub struct Scope<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Clone for Scope<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scope").field(&self.inner.borrow()).finish()
    }
}

impl<T> Scope<T> {
    /// Create a fresh scope owning `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Obtain the handle a consumer needs, or report a wiring defect.
    pub fn try_consume(
        scope: Option<&Self>,
        component: &'static str,
        owner: &'static str,
    ) -> Result<Self, UsageError> {
        scope
            .cloned()
            .ok_or(UsageError::OutsideScope { component, owner })
    }

    /// Obtain the handle a consumer needs.
    ///
    /// # Panics
    ///
    /// Panics with the [`UsageError::OutsideScope`] message when `scope` is
    /// `None`: the component was mounted outside its owner.
    #[must_use]
    pub fn consume(scope: Option<&Self>, component: &'static str, owner: &'static str) -> Self {
        match Self::try_consume(scope, component, owner) {
            Ok(scope) => scope,
            Err(err) => panic!("{err}"),
        }
    }

    /// Borrow the shared state.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Mutably borrow the shared state.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Run `f` with shared access.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Run `f` with exclusive access.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Whether two handles point at the same owner.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
