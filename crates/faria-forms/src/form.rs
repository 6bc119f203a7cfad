#![forbid(unsafe_code)]

//! The form engine: a named set of fields, validation triggers and an
//! async submit with an in-flight flag.
//!
//! # Validation triggers
//!
//! - **Blur** marks the field touched and validates it.
//! - **Typing** stores the value and revalidates only a field that already
//!   shows an error, so a visible error clears as soon as the input is
//!   corrected while a clean field never grows one mid-typing.
//! - **Submit** marks every field touched and validates all of them.
//!
//! # Invariants
//!
//! - `is_submitting` is `true` exactly while a [`Form::submit`] future is
//!   alive; an RAII guard clears it when the handler settles, when
//!   validation fails, and when the future is dropped mid-flight.
//! - The submit handler runs only if every field passes, and receives the
//!   values as a flat name → value map.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Submit while one is in flight | `SubmitOutcome::AlreadySubmitting`, handler not called |
//! | Handler returns `Err` | passed back untouched in `Submitted(Err(_))` |
//! | Name not registered | `UsageError::NotRegistered` from the `try_*`/setter APIs |
//!
//! # Example
//!
//! ```
//! use faria_forms::form::{Form, SubmitOutcome};
//! use faria_forms::rules::Rules;
//!
//! let form = Form::new();
//! form.register("email", "", Rules::new().required());
//! form.set_value("email", "ada@example.com").unwrap();
//!
//! let outcome = pollster::block_on(form.submit(|values| async move {
//!     Ok::<_, ()>(values["email"].clone())
//! }));
//! assert_eq!(outcome, SubmitOutcome::Submitted(Ok("ada@example.com".to_string())));
//! ```

use faria_core::error::UsageError;
use faria_core::registry::Registry;
use faria_core::scope::Scope;
use faria_widgets::aria::AriaAttrs;

use crate::field::FieldState;
use crate::rules::{Rules, ValidationError, Values};

const OWNER: &str = "Form";

/// Shared state behind a [`Form`] handle.
#[derive(Debug, Default)]
pub struct FormState {
    pub(crate) fields: Registry<String, FieldState>,
    submitting: bool,
}

impl FormState {
    pub(crate) fn register(&mut self, name: String, field: FieldState) -> bool {
        self.fields.register(name, field)
    }

    pub(crate) fn unregister(&mut self, name: &str) -> bool {
        self.fields.unregister(&name.to_string()).is_some()
    }

    pub(crate) fn acquire(&mut self, name: String, field: FieldState) -> bool {
        self.fields.acquire(name, field)
    }

    pub(crate) fn release(&mut self, name: &str) -> bool {
        self.fields.release(&name.to_string()).is_some()
    }

    pub(crate) fn values(&self) -> Values {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value().to_string()))
            .collect()
    }

    /// Returns `false` if `name` is unknown.
    pub(crate) fn set_value(&mut self, name: &str, value: String) -> bool {
        let key = name.to_string();
        let Some(field) = self.fields.get_mut(&key) else {
            return false;
        };
        field.set_value(value);
        if field.error().is_some() {
            let values = self.values();
            if let Some(field) = self.fields.get_mut(&key) {
                field.validate(&values);
            }
        }
        true
    }

    /// Touch and validate `name`. `None` if unknown.
    pub(crate) fn blur(&mut self, name: &str) -> Option<bool> {
        let values = self.values();
        let field = self.fields.get_mut(&name.to_string())?;
        field.touch();
        Some(field.validate(&values))
    }

    /// Touch and validate every field. Returns the names that failed.
    fn validate_all(&mut self) -> Vec<String> {
        let values = self.values();
        let mut failed = Vec::new();
        for (name, field) in self.fields.iter_mut() {
            field.touch();
            if !field.validate(&values) {
                failed.push(name.clone());
            }
        }
        failed
    }
}

/// Result of [`Form::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T, E> {
    /// Validation failed; names of the failing fields in registration order.
    Invalid(Vec<String>),
    /// The handler ran; its result is passed through unchanged.
    Submitted(Result<T, E>),
    /// A previous submit is still in flight.
    AlreadySubmitting,
}

impl<T, E> SubmitOutcome<T, E> {
    /// Whether the handler ran.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// Read-only copy of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSnapshot {
    /// Current value.
    pub value: String,
    /// Error from the last validation run.
    pub error: Option<ValidationError>,
    /// Blurred or submitted at least once.
    pub touched: bool,
    /// Value differs from the initial value.
    pub dirty: bool,
}

/// Handle to a form. Clones share state.
#[derive(Debug, Clone)]
pub struct Form {
    scope: Scope<FormState>,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            scope: Scope::new(FormState::default()),
        }
    }
}

struct SubmittingGuard {
    scope: Scope<FormState>,
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.scope.with_mut(|s| s.submitting = false);
    }
}

impl Form {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope handed to [`Field`](crate::field::Field) components.
    #[must_use]
    pub fn scope(&self) -> Scope<FormState> {
        self.scope.clone()
    }

    /// Register a field. Returns `false` (keeping the existing field) when
    /// the name is already registered.
    pub fn register(
        &self,
        name: impl Into<String>,
        initial: impl Into<String>,
        rules: Rules,
    ) -> bool {
        self.scope
            .with_mut(|s| s.register(name.into(), FieldState::new(initial, rules)))
    }

    /// Remove a field. Returns `false` if it was not registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.scope.with_mut(|s| s.unregister(name))
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scope.with(|s| s.fields.contains(&name.to_string()))
    }

    /// Registered field names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.scope.with(|s| s.fields.keys().cloned().collect())
    }

    /// Copy of one field's state.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotRegistered`] if `name` is unknown.
    pub fn try_field(&self, name: &str) -> Result<FieldSnapshot, UsageError> {
        self.scope.with(|s| {
            s.fields
                .get(&name.to_string())
                .map(|f| FieldSnapshot {
                    value: f.value().to_string(),
                    error: f.error().cloned(),
                    touched: f.is_touched(),
                    dirty: f.is_dirty(),
                })
                .ok_or_else(|| not_registered(name))
        })
    }

    /// Typing into a field.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotRegistered`] if `name` is unknown.
    pub fn set_value(&self, name: &str, value: impl Into<String>) -> Result<(), UsageError> {
        let value = value.into();
        if self.scope.with_mut(|s| s.set_value(name, value)) {
            Ok(())
        } else {
            Err(not_registered(name))
        }
    }

    /// A field lost focus. Returns whether it is valid.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotRegistered`] if `name` is unknown.
    pub fn blur(&self, name: &str) -> Result<bool, UsageError> {
        self.scope
            .with_mut(|s| s.blur(name))
            .ok_or_else(|| not_registered(name))
    }

    /// Touch and validate every field. Returns `true` if all pass.
    pub fn validate_all(&self) -> bool {
        self.scope.with_mut(FormState::validate_all).is_empty()
    }

    /// Current values, name → value.
    #[must_use]
    pub fn values(&self) -> Values {
        self.scope.with(FormState::values)
    }

    /// First error message per failing field.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, String)> {
        self.scope.with(|s| {
            s.fields
                .iter()
                .filter_map(|(name, f)| f.error_message().map(|m| (name.clone(), m)))
                .collect()
        })
    }

    /// Whether no field currently shows an error. Fields never
    /// validated count as valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.scope.with(|s| s.fields.values().all(|f| f.error().is_none()))
    }

    /// Whether any field differs from its initial value.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.scope.with(|s| s.fields.values().any(FieldState::is_dirty))
    }

    /// Whether a submit is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.scope.with(|s| s.submitting)
    }

    /// Restore every field to its initial value and clear errors and
    /// touched flags.
    pub fn reset(&self) {
        self.scope
            .with_mut(|s| s.fields.values_mut().for_each(|f| f.reset(None)));
    }

    /// Reset and adopt the current values as the new initial values, so the
    /// form reads as clean after a successful save.
    pub fn commit(&self) {
        self.scope.with_mut(|s| {
            for field in s.fields.values_mut() {
                let current = field.value().to_string();
                field.reset(Some(current));
            }
        });
    }

    /// `aria-busy` while a submit is in flight.
    #[must_use]
    pub fn attrs(&self) -> AriaAttrs {
        AriaAttrs::new().set("aria-busy", self.is_submitting().to_string())
    }

    /// Validate everything and, if valid, await `handler` with the values.
    ///
    /// No borrow of the form is held across the await, so the handler may
    /// read the form (e.g. `is_submitting`).
    pub async fn submit<F, Fut, T, E>(&self, handler: F) -> SubmitOutcome<T, E>
    where
        F: FnOnce(Values) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = self.scope.with_mut(|s| !std::mem::replace(&mut s.submitting, true));
        if !started {
            faria_core::debug!("submit ignored: already submitting");
            return SubmitOutcome::AlreadySubmitting;
        }
        let _guard = SubmittingGuard {
            scope: self.scope.clone(),
        };

        let failed = self.scope.with_mut(FormState::validate_all);
        if !failed.is_empty() {
            faria_core::debug!(failed = failed.len(), "submit blocked by validation");
            return SubmitOutcome::Invalid(failed);
        }

        let values = self.values();
        faria_core::debug!(fields = values.len(), "submit started");
        let result = handler(values).await;
        faria_core::debug!(ok = result.is_ok(), "submit finished");
        SubmitOutcome::Submitted(result)
    }
}

pub(crate) fn not_registered(name: &str) -> UsageError {
    UsageError::NotRegistered {
        owner: OWNER,
        key: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::pin::pin;
    use std::rc::Rc;
    use std::task::{Context, Poll, Waker};

    use pollster::block_on;

    fn signup() -> Form {
        let form = Form::new();
        form.register("name", "", Rules::new().required().min_length(2));
        form.register("password", "", Rules::new().required().min_length(6));
        form.register("confirm", "", Rules::new().required().matches("password"));
        form
    }

    fn code(form: &Form, name: &str) -> Option<&'static str> {
        form.try_field(name).unwrap().error.map(|e| e.code)
    }

    #[test]
    fn register_is_idempotent() {
        let form = Form::new();
        assert!(form.register("a", "first", Rules::new()));
        assert!(!form.register("a", "second", Rules::new()));
        assert_eq!(form.values()["a"], "first");
        assert_eq!(form.names(), vec!["a".to_string()]);
    }

    #[test]
    fn blur_reports_first_failing_rule_then_typing_updates_it() {
        let form = signup();
        assert_eq!(form.blur("name"), Ok(false));
        assert_eq!(code(&form, "name"), Some("required"));

        form.set_value("name", "a").unwrap();
        assert_eq!(code(&form, "name"), Some("too_short"));

        form.set_value("name", "ab").unwrap();
        assert_eq!(code(&form, "name"), None);
    }

    #[test]
    fn typing_alone_never_touches_or_errors() {
        let form = signup();
        form.set_value("name", "a").unwrap();
        let snap = form.try_field("name").unwrap();
        assert!(!snap.touched);
        assert!(snap.error.is_none());
        assert!(snap.dirty);
    }

    #[test]
    fn unknown_names_are_usage_errors() {
        let form = signup();
        let err = form.set_value("nope", "x").unwrap_err();
        assert_eq!(
            err,
            UsageError::NotRegistered {
                owner: "Form",
                key: "nope".into()
            }
        );
        assert!(form.blur("nope").is_err());
        assert!(form.try_field("nope").is_err());
    }

    #[test]
    fn cross_field_rule_sees_current_values() {
        let form = signup();
        form.set_value("password", "secret1").unwrap();
        form.set_value("confirm", "secret2").unwrap();
        assert_eq!(form.blur("confirm"), Ok(false));
        assert_eq!(code(&form, "confirm"), Some("mismatch"));
        form.set_value("confirm", "secret1").unwrap();
        assert!(form.is_valid());
    }

    #[test]
    fn invalid_submit_touches_everything_and_skips_handler() {
        let form = signup();
        form.set_value("name", "Ada").unwrap();
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);
        let outcome = block_on(form.submit(move |_| async move {
            *flag.borrow_mut() = true;
            Ok::<(), ()>(())
        }));
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid(vec!["password".into(), "confirm".into()])
        );
        assert!(!*called.borrow());
        assert!(form.names().iter().all(|n| form.try_field(n).unwrap().touched));
        assert!(!form.is_submitting());
        assert_eq!(form.errors().len(), 2);
    }

    #[test]
    fn valid_submit_flips_flag_and_passes_values() {
        let form = signup();
        form.set_value("name", "Ada").unwrap();
        form.set_value("password", "lovelace").unwrap();
        form.set_value("confirm", "lovelace").unwrap();

        assert!(!form.is_submitting());
        let seen = form.clone();
        let outcome = block_on(form.submit(move |values| async move {
            assert!(seen.is_submitting());
            assert_eq!(seen.attrs().get("aria-busy"), Some("true"));
            Ok::<_, String>(values)
        }));
        assert!(!form.is_submitting());
        assert_eq!(form.attrs().get("aria-busy"), Some("false"));

        let SubmitOutcome::Submitted(Ok(values)) = outcome else {
            panic!("expected submitted outcome");
        };
        assert_eq!(values, form.values());
        assert_eq!(values.len(), 3);
        assert_eq!(values["password"], "lovelace");
    }

    #[test]
    fn handler_failure_is_passed_through_and_clears_flag() {
        let form = Form::new();
        form.register("x", "ok", Rules::new());
        let outcome: SubmitOutcome<(), &str> =
            block_on(form.submit(|_| async { Err("server said no") }));
        assert_eq!(outcome, SubmitOutcome::Submitted(Err("server said no")));
        assert!(outcome.is_submitted());
        assert!(!form.is_submitting());
    }

    #[test]
    fn dropping_in_flight_submit_clears_flag_and_blocks_double_submit() {
        let form = Form::new();
        form.register("x", "ok", Rules::new());
        let mut cx = Context::from_waker(Waker::noop());
        {
            let mut pending =
                pin!(form.submit(|_| std::future::pending::<Result<(), ()>>()));
            assert_eq!(pending.as_mut().poll(&mut cx), Poll::Pending);
            assert!(form.is_submitting());

            let second = block_on(form.submit(|_| async { Ok::<(), ()>(()) }));
            assert_eq!(second, SubmitOutcome::AlreadySubmitting);
            assert!(form.is_submitting());
        }
        assert!(!form.is_submitting());
    }

    #[test]
    fn reset_and_commit() {
        let form = signup();
        form.set_value("name", "Ada").unwrap();
        form.blur("password").unwrap();
        assert!(form.is_dirty());

        form.reset();
        assert!(!form.is_dirty());
        assert!(form.is_valid());
        assert_eq!(form.values()["name"], "");

        form.set_value("name", "Grace").unwrap();
        form.commit();
        assert!(!form.is_dirty());
        assert_eq!(form.values()["name"], "Grace");
        form.reset();
        assert_eq!(form.values()["name"], "Grace");
    }

    #[test]
    fn unregister_removes_from_values() {
        let form = signup();
        assert!(form.unregister("confirm"));
        assert!(!form.unregister("confirm"));
        assert!(!form.contains("confirm"));
        assert_eq!(form.values().len(), 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn typing_never_sets_touched(inputs in prop::collection::vec("[a-z]{0,8}", 1..10)) {
                let form = Form::new();
                form.register("f", "", Rules::new().required().min_length(3));
                for input in &inputs {
                    form.set_value("f", input.as_str()).unwrap();
                }
                let snap = form.try_field("f").unwrap();
                prop_assert!(!snap.touched);
                prop_assert!(snap.error.is_none());
            }

            #[test]
            fn error_after_blur_tracks_typing(
                inputs in prop::collection::vec("[a-z]{0,5}", 1..10),
            ) {
                let rules = || Rules::new().required().min_length(3);
                let form = Form::new();
                form.register("f", "", rules());
                form.blur("f").unwrap();
                for input in &inputs {
                    form.set_value("f", input.as_str()).unwrap();
                    let expected = rules().check(input, &Values::new()).into_error();
                    let snap = form.try_field("f").unwrap();
                    // Once the error clears, typing stops revalidating.
                    if snap.error.is_none() {
                        break;
                    }
                    prop_assert_eq!(snap.error, expected);
                }
            }
        }
    }
}
