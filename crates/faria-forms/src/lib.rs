#![forbid(unsafe_code)]

//! Form state for FrankenARIA: ordered validation rules, per-field
//! value/error/touched tracking, and an async submit that never leaves the
//! form stuck in its submitting state.

/// Per-field state and the mounted field handle.
pub mod field;
/// The form engine and async submit.
pub mod form;
/// Validation rules and their error values.
pub mod rules;

pub use field::{Field, FieldState};
pub use form::{FieldSnapshot, Form, FormState, SubmitOutcome};
pub use rules::{
    Custom, MatchesField, MaxLength, MinLength, Pattern, Required, Rule, Rules, ValidationError,
    ValidationResult, Values,
};
