#![forbid(unsafe_code)]

//! Usage errors: wiring defects detected at the point of misuse.
//!
//! Validation failures and submission failures are not errors at this layer
//! (they are values, see `faria-forms`). Timer and focus races are silent
//! no-ops. What remains is a consumer reaching for shared state it has no
//! access to, which is reported here.

use std::fmt;

/// A primitive was used outside the scope that owns its shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A component that needs its owner's shared state was mounted outside
    /// that owner (e.g. a `Tab` rendered outside `Tabs`).
    OutsideScope {
        /// The consuming component.
        component: &'static str,
        /// The component that must enclose it.
        owner: &'static str,
    },
    /// A component referenced a key its owner never registered.
    NotRegistered {
        /// The owner that was asked.
        owner: &'static str,
        /// The unknown key.
        key: String,
    },
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideScope { component, owner } => {
                write!(f, "`{component}` must be used within `{owner}`")
            }
            Self::NotRegistered { owner, key } => {
                write!(f, "`{owner}` has no registered item `{key}`")
            }
        }
    }
}

impl std::error::Error for UsageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_sides() {
        let err = UsageError::OutsideScope {
            component: "Tab",
            owner: "Tabs",
        };
        assert_eq!(err.to_string(), "`Tab` must be used within `Tabs`");
    }

    #[test]
    fn display_not_registered() {
        let err = UsageError::NotRegistered {
            owner: "Form",
            key: "email".into(),
        };
        assert_eq!(err.to_string(), "`Form` has no registered item `email`");
    }
}
