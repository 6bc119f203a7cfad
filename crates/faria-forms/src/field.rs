#![forbid(unsafe_code)]

//! Per-field state and the mounted field handle.
//!
//! [`FieldState`] is the record a [`Form`](crate::form::Form) keeps for each
//! registered name. [`Field`] is what an input component holds: it registers
//! the name on mount, reads and writes through the form's shared scope, and
//! unregisters on drop.
//!
//! # Invariants
//!
//! - `error` is only ever written by a validation run on this field.
//! - `touched` is set by blur or a submit attempt, never by a value change.
//! - `dirty` means the value differs from the value the field was
//!   registered (or last reset) with.

use faria_core::element::ElementId;
use faria_core::error::UsageError;
use faria_core::scope::Scope;
use faria_widgets::aria::{AriaAttrs, Politeness, dom_id};

use crate::form::{FormState, not_registered};
use crate::rules::{Rules, ValidationError, Values};

/// One registered field.
#[derive(Debug)]
pub struct FieldState {
    value: String,
    initial: String,
    error: Option<ValidationError>,
    touched: bool,
    rules: Rules,
}

impl FieldState {
    /// Untouched, clean field holding `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>, rules: Rules) -> Self {
        let initial = initial.into();
        Self {
            value: initial.clone(),
            initial,
            error: None,
            touched: false,
            rules,
        }
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value the field compares against for `is_dirty`.
    #[must_use]
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Error from the most recent validation run, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Formatted message of the current error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ValidationError::format_message)
    }

    /// Whether the field was blurred or submitted.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Whether the value differs from the initial value.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.value != self.initial
    }

    /// The field's rules.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = value;
    }

    pub(crate) fn touch(&mut self) {
        self.touched = true;
    }

    /// Run the rules against the current value. Returns `true` if valid.
    pub(crate) fn validate(&mut self, values: &Values) -> bool {
        self.error = self.rules.check(&self.value, values).into_error();
        self.error.is_none()
    }

    pub(crate) fn reset(&mut self, initial: Option<String>) {
        if let Some(initial) = initial {
            self.initial = initial;
        }
        self.value = self.initial.clone();
        self.error = None;
        self.touched = false;
    }

    /// Attributes for the input element.
    #[must_use]
    pub fn input_attrs(&self, input: ElementId) -> AriaAttrs {
        let attrs = AriaAttrs::new()
            .id(dom_id(input, "field"))
            .invalid(self.error.is_some());
        if self.error.is_some() {
            attrs.described_by(dom_id(input, "error"))
        } else {
            attrs
        }
    }

    /// Attributes for the element that shows this field's error.
    #[must_use]
    pub fn error_attrs(&self, input: ElementId) -> AriaAttrs {
        AriaAttrs::new()
            .id(dom_id(input, "error"))
            .live(Politeness::Polite)
    }
}

/// Handle held by a mounted input.
///
/// Two handles for the same name share one [`FieldState`]; the field stays
/// registered until the last of them is dropped.
pub struct Field {
    scope: Scope<FormState>,
    name: String,
    input: ElementId,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("input", &self.input)
            .finish()
    }
}

impl Field {
    /// Register `name` with the enclosing form and return its handle.
    /// Mounting a name that already exists keeps the existing state.
    ///
    /// # Errors
    ///
    /// [`UsageError::OutsideScope`] if `scope` is `None`.
    pub fn try_mount(
        scope: Option<&Scope<FormState>>,
        name: impl Into<String>,
        input: ElementId,
        initial: impl Into<String>,
        rules: Rules,
    ) -> Result<Self, UsageError> {
        let scope = Scope::try_consume(scope, "Field", "Form")?;
        let name = name.into();
        scope.with_mut(|s| s.acquire(name.clone(), FieldState::new(initial, rules)));
        Ok(Self { scope, name, input })
    }

    /// Mount a field.
    ///
    /// # Panics
    ///
    /// Panics if `scope` is `None` (field rendered outside a form).
    #[must_use]
    pub fn mount(
        scope: Option<&Scope<FormState>>,
        name: impl Into<String>,
        input: ElementId,
        initial: impl Into<String>,
        rules: Rules,
    ) -> Self {
        match Self::try_mount(scope, name, input, initial, rules) {
            Ok(field) => field,
            Err(err) => panic!("{err}"),
        }
    }

    /// The registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn read<R>(&self, f: impl FnOnce(&FieldState) -> R) -> Option<R> {
        self.scope.with(|s| s.fields.get(&self.name).map(f))
    }

    /// Current value; empty once the form has dropped the name.
    #[must_use]
    pub fn value(&self) -> String {
        self.read(|f| f.value.clone()).unwrap_or_default()
    }

    /// Message to render under the input.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.read(FieldState::error_message).flatten()
    }

    /// Whether the field was blurred or submitted.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.read(FieldState::is_touched).unwrap_or(false)
    }

    /// Whether the value differs from the initial value.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.read(FieldState::is_dirty).unwrap_or(false)
    }

    /// Input change. Revalidates only if the field currently shows an error.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotRegistered`] if the form dropped the name (through
    /// [`Form::unregister`](crate::form::Form::unregister)).
    pub fn set_value(&self, value: impl Into<String>) -> Result<(), UsageError> {
        let value = value.into();
        if self.scope.with_mut(|s| s.set_value(&self.name, value)) {
            Ok(())
        } else {
            Err(not_registered(&self.name))
        }
    }

    /// Input lost focus: mark touched and validate. Returns `true` if valid.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotRegistered`] if the form dropped the name.
    pub fn blur(&self) -> Result<bool, UsageError> {
        self.scope
            .with_mut(|s| s.blur(&self.name))
            .ok_or_else(|| not_registered(&self.name))
    }

    /// Attributes for the input element.
    #[must_use]
    pub fn input_attrs(&self) -> AriaAttrs {
        self.read(|f| f.input_attrs(self.input)).unwrap_or_default()
    }

    /// Attributes for the error message element.
    #[must_use]
    pub fn error_attrs(&self) -> AriaAttrs {
        self.read(|f| f.error_attrs(self.input)).unwrap_or_default()
    }
}

impl Drop for Field {
    fn drop(&mut self) {
        self.scope.with_mut(|s| s.release(&self.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;

    fn input() -> ElementId {
        ElementId::next()
    }

    #[test]
    fn state_starts_clean() {
        let state = FieldState::new("bob", Rules::new().required());
        assert_eq!(state.value(), "bob");
        assert_eq!(state.initial(), "bob");
        assert!(state.error().is_none());
        assert!(!state.is_touched());
        assert!(!state.is_dirty());
        assert_eq!(state.rules().len(), 1);
    }

    #[test]
    fn validate_replaces_previous_error() {
        let mut state = FieldState::new("", Rules::new().required().min_length(2));
        assert!(!state.validate(&Values::new()));
        assert_eq!(state.error().map(|e| e.code), Some("required"));
        state.set_value("a".into());
        assert!(!state.validate(&Values::new()));
        assert_eq!(state.error().map(|e| e.code), Some("too_short"));
        state.set_value("ab".into());
        assert!(state.validate(&Values::new()));
        assert!(state.error().is_none());
    }

    #[test]
    fn input_attrs_point_at_error_only_when_invalid() {
        let el = input();
        let mut state = FieldState::new("", Rules::new().required());
        let clean = state.input_attrs(el);
        assert_eq!(clean.get("aria-invalid"), Some("false"));
        assert!(!clean.contains("aria-describedby"));

        state.validate(&Values::new());
        let invalid = state.input_attrs(el);
        assert_eq!(invalid.get("aria-invalid"), Some("true"));
        assert_eq!(
            invalid.get("aria-describedby"),
            state.error_attrs(el).get("id")
        );
    }

    #[test]
    fn reset_restores_initial_and_clears_flags() {
        let mut state = FieldState::new("a", Rules::new().min_length(3));
        state.set_value("ab".into());
        state.touch();
        state.validate(&Values::new());
        state.reset(None);
        assert_eq!(state.value(), "a");
        assert!(!state.is_touched());
        assert!(state.error().is_none());

        state.reset(Some("new".into()));
        assert_eq!(state.initial(), "new");
        assert!(!state.is_dirty());
    }

    #[test]
    fn mounted_field_reads_through_form() {
        let form = Form::new();
        let el = input();
        let field = Field::mount(Some(&form.scope()), "name", el, "", Rules::new().required());
        assert_eq!(field.name(), "name");
        field.set_value("x").unwrap();
        assert_eq!(form.values().get("name").map(String::as_str), Some("x"));
        assert!(field.is_dirty());
        assert!(!field.is_touched());
        assert_eq!(field.blur(), Ok(true));
        assert!(field.is_touched());
    }

    #[test]
    fn typing_into_clean_field_shows_no_error() {
        let form = Form::new();
        let scope = form.scope();
        let field = Field::mount(Some(&scope), "code", input(), "", Rules::new().min_length(4));
        field.set_value("ab").unwrap();
        assert_eq!(field.error_message(), None);
        assert_eq!(field.blur(), Ok(false));
        assert_eq!(
            field.error_message().as_deref(),
            Some("Must be at least 4 characters")
        );
        field.set_value("abcd").unwrap();
        assert_eq!(field.error_message(), None);
        assert_eq!(field.input_attrs().get("aria-invalid"), Some("false"));
    }

    #[test]
    fn drop_unregisters() {
        let form = Form::new();
        {
            let _field = Field::mount(Some(&form.scope()), "temp", input(), "", Rules::new());
            assert!(form.contains("temp"));
        }
        assert!(!form.contains("temp"));
    }

    #[test]
    fn second_mount_keeps_field_alive_after_first_drops() {
        let form = Form::new();
        let scope = form.scope();
        let first = Field::mount(Some(&scope), "email", input(), "", Rules::new().required());
        let second = Field::mount(Some(&scope), "email", input(), "", Rules::new().required());
        drop(first);

        assert!(form.contains("email"));
        assert_eq!(second.blur(), Ok(false));
        second.set_value("ada@example.com").unwrap();
        assert_eq!(second.value(), "ada@example.com");
        assert_eq!(form.values()["email"], "ada@example.com");

        drop(second);
        assert!(!form.contains("email"));
    }

    #[test]
    fn required_field_still_blocks_submit_after_duplicate_unmounts() {
        let form = Form::new();
        let scope = form.scope();
        let first = Field::mount(Some(&scope), "email", input(), "", Rules::new().required());
        let _second = Field::mount(Some(&scope), "email", input(), "", Rules::new().required());
        drop(first);

        assert!(!form.validate_all());
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn handle_reports_name_removed_by_form() {
        let form = Form::new();
        let field = Field::mount(Some(&form.scope()), "gone", input(), "", Rules::new().required());
        assert!(form.unregister("gone"));

        let expected = UsageError::NotRegistered {
            owner: "Form",
            key: "gone".into(),
        };
        assert_eq!(field.set_value("x"), Err(expected.clone()));
        assert_eq!(field.blur(), Err(expected));
        drop(field);
        assert!(!form.contains("gone"));
    }

    #[test]
    fn mount_outside_form_is_usage_error() {
        let err = Field::try_mount(None, "x", input(), "", Rules::new()).unwrap_err();
        assert_eq!(err.to_string(), "`Field` must be used within `Form`");
    }

    #[test]
    #[should_panic(expected = "must be used within `Form`")]
    fn mount_outside_form_panics() {
        let _ = Field::mount(None, "x", input(), "", Rules::new());
    }
}
