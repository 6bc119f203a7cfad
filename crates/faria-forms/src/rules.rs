#![forbid(unsafe_code)]

//! Validation rules for form fields.
//!
//! A rule is a pure predicate over a field's current string value (and, for
//! cross-field rules, the values of every other field) paired with the
//! message shown when it fails. [`Rules`] holds an ordered list and reports
//! the first failure only.
//!
//! # Invariants
//!
//! - Rules carry no shared state; checking is a pure function of the inputs.
//! - An empty value passes every built-in rule except [`Required`], so an
//!   optional field with a [`Pattern`] does not block empty input.
//! - [`Rules::check`] short-circuits: at most one error is reported, from
//!   the first failing rule in registration order.
//!
//! # Example
//!
//! ```
//! use faria_forms::rules::{Rules, Values};
//!
//! let rules = Rules::new().required().min_length(3);
//! let values = Values::new();
//! assert_eq!(rules.check("", &values).error().map(|e| e.code), Some("required"));
//! assert_eq!(rules.check("ab", &values).error().map(|e| e.code), Some("too_short"));
//! assert!(rules.check("abc", &values).is_valid());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

/// Flat name → value mapping of a form's fields.
pub type Values = BTreeMap<String, String>;

/// Error code for [`Required`].
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for [`MinLength`].
pub const ERROR_CODE_MIN_LENGTH: &str = "too_short";
/// Error code for [`MaxLength`].
pub const ERROR_CODE_MAX_LENGTH: &str = "too_long";
/// Error code for [`Pattern`].
pub const ERROR_CODE_PATTERN: &str = "pattern";
/// Error code for [`MatchesField`].
pub const ERROR_CODE_MISMATCH: &str = "mismatch";

/// A failed rule: stable code, message template, interpolation params.
///
/// ```
/// use faria_forms::rules::ValidationError;
///
/// let err = ValidationError::new("too_short", "At least {min} characters").with_param("min", 8);
/// assert_eq!(err.to_string(), "At least 8 characters");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable identifier for programmatic handling and translation lookup.
    pub code: &'static str,
    /// Message template; `{key}` is replaced by the matching param.
    pub message: String,
    /// Interpolation parameters.
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    /// Create an error with no params.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add an interpolation parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// The message with every `{key}` substituted.
    #[must_use]
    pub fn format_message(&self) -> String {
        self.params
            .iter()
            .fold(self.message.clone(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_message())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of checking one value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    /// Every rule passed.
    #[default]
    Valid,
    /// The first failing rule's error.
    Invalid(ValidationError),
}

impl ValidationResult {
    /// Whether every rule passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Whether some rule failed.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The error, if invalid.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(err) => Some(err),
        }
    }

    /// Consume into the error, if invalid.
    #[must_use]
    pub fn into_error(self) -> Option<ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(err) => Some(err),
        }
    }

    fn fail_if(failed: bool, error: impl FnOnce() -> ValidationError) -> Self {
        if failed {
            Self::Invalid(error())
        } else {
            Self::Valid
        }
    }
}

/// A single validation rule.
///
/// Implement this for rules the built-ins don't cover; [`Custom`] wraps a
/// closure when a full type is overkill.
pub trait Rule {
    /// Check `value`. `values` holds every field of the form, for rules that
    /// compare against another field.
    fn check(&self, value: &str, values: &Values) -> ValidationResult;

    /// Replace the message this rule reports.
    fn with_message(self, message: impl Into<String>) -> WithMessage<Self>
    where
        Self: Sized,
    {
        WithMessage {
            inner: self,
            message: message.into(),
        }
    }
}

/// A rule whose failure message has been overridden.
#[derive(Debug, Clone)]
pub struct WithMessage<R> {
    inner: R,
    message: String,
}

impl<R: Rule> Rule for WithMessage<R> {
    fn check(&self, value: &str, values: &Values) -> ValidationResult {
        match self.inner.check(value, values) {
            ValidationResult::Valid => ValidationResult::Valid,
            ValidationResult::Invalid(err) => ValidationResult::Invalid(ValidationError {
                message: self.message.clone(),
                ..err
            }),
        }
    }
}

/// Value must be non-empty. Whitespace-only counts as empty unless
/// [`Required::allow_whitespace`] is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required {
    /// Treat whitespace-only input as filled in.
    pub allow_whitespace: bool,
}

impl Required {
    /// Whitespace-only input fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept whitespace-only input.
    #[must_use]
    pub fn allow_whitespace(mut self) -> Self {
        self.allow_whitespace = true;
        self
    }
}

impl Rule for Required {
    fn check(&self, value: &str, _values: &Values) -> ValidationResult {
        let empty = if self.allow_whitespace {
            value.is_empty()
        } else {
            value.trim().is_empty()
        };
        ValidationResult::fail_if(empty, || {
            ValidationError::new(ERROR_CODE_REQUIRED, "This field is required")
        })
    }
}

/// At least `min` characters (Unicode scalar values, not bytes).
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    /// Minimum character count.
    pub min: usize,
}

impl MinLength {
    /// Require at least `min` characters.
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Rule for MinLength {
    fn check(&self, value: &str, _values: &Values) -> ValidationResult {
        let len = value.chars().count();
        ValidationResult::fail_if(!value.is_empty() && len < self.min, || {
            ValidationError::new(ERROR_CODE_MIN_LENGTH, "Must be at least {min} characters")
                .with_param("min", self.min)
                .with_param("actual", len)
        })
    }
}

/// At most `max` characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    /// Maximum character count.
    pub max: usize,
}

impl MaxLength {
    /// Allow at most `max` characters.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Rule for MaxLength {
    fn check(&self, value: &str, _values: &Values) -> ValidationResult {
        let len = value.chars().count();
        ValidationResult::fail_if(len > self.max, || {
            ValidationError::new(ERROR_CODE_MAX_LENGTH, "Must be at most {max} characters")
                .with_param("max", self.max)
                .with_param("actual", len)
        })
    }
}

/// Value must match a regular expression somewhere. Anchor the pattern
/// (`^...$`) to require a whole-value match.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the compile error for an invalid pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::from_regex)
    }

    /// Wrap an already compiled regex.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Rule for Pattern {
    fn check(&self, value: &str, _values: &Values) -> ValidationResult {
        ValidationResult::fail_if(!value.is_empty() && !self.regex.is_match(value), || {
            ValidationError::new(ERROR_CODE_PATTERN, "Invalid format")
                .with_param("pattern", self.regex.as_str())
        })
    }
}

/// Value must equal another field's current value (password confirmation).
/// A missing other field compares as empty.
#[derive(Debug, Clone)]
pub struct MatchesField {
    /// Name of the field to compare against.
    pub field: String,
}

impl MatchesField {
    /// Compare against the field named `field`.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Rule for MatchesField {
    fn check(&self, value: &str, values: &Values) -> ValidationResult {
        let other = values.get(&self.field).map_or("", String::as_str);
        ValidationResult::fail_if(!value.is_empty() && value != other, || {
            ValidationError::new(ERROR_CODE_MISMATCH, "Must match {field}")
                .with_param("field", &self.field)
        })
    }
}

type Predicate = Box<dyn Fn(&str, &Values) -> bool>;

/// Closure rule. The predicate returns `true` when the value is acceptable;
/// it is not called for empty values.
pub struct Custom {
    code: &'static str,
    message: String,
    predicate: Predicate,
}

impl Custom {
    /// Rule failing with `code` and `message` when `predicate` rejects
    /// a non-empty value.
    pub fn new(
        code: &'static str,
        message: impl Into<String>,
        predicate: impl Fn(&str, &Values) -> bool + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("code", &self.code)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Rule for Custom {
    fn check(&self, value: &str, values: &Values) -> ValidationResult {
        ValidationResult::fail_if(!value.is_empty() && !(self.predicate)(value, values), || {
            ValidationError::new(self.code, self.message.clone())
        })
    }
}

/// Ordered rule list for one field.
#[derive(Default)]
pub struct Rules {
    rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("len", &self.rules.len())
            .finish()
    }
}

impl Rules {
    /// No rules: every value passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any rule.
    #[must_use]
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Append [`Required`].
    #[must_use]
    pub fn required(self) -> Self {
        self.rule(Required::new())
    }

    /// Append [`MinLength`].
    #[must_use]
    pub fn min_length(self, min: usize) -> Self {
        self.rule(MinLength::new(min))
    }

    /// Append [`MaxLength`].
    #[must_use]
    pub fn max_length(self, max: usize) -> Self {
        self.rule(MaxLength::new(max))
    }

    /// Append a compiled [`Pattern`].
    #[must_use]
    pub fn pattern(self, pattern: Pattern) -> Self {
        self.rule(pattern)
    }

    /// Append [`MatchesField`] against `field`.
    #[must_use]
    pub fn matches(self, field: impl Into<String>) -> Self {
        self.rule(MatchesField::new(field))
    }

    /// Append a [`Custom`] closure rule.
    #[must_use]
    pub fn custom(
        self,
        code: &'static str,
        message: impl Into<String>,
        predicate: impl Fn(&str, &Values) -> bool + 'static,
    ) -> Self {
        self.rule(Custom::new(code, message, predicate))
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First failure in registration order, or `Valid`.
    #[must_use]
    pub fn check(&self, value: &str, values: &Values) -> ValidationResult {
        self.rules
            .iter()
            .map(|rule| rule.check(value, values))
            .find(ValidationResult::is_invalid)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> Values {
        Values::new()
    }

    fn code(result: &ValidationResult) -> Option<&'static str> {
        result.error().map(|e| e.code)
    }

    #[test]
    fn required_trims_by_default() {
        assert!(Required::new().check("   ", &none()).is_invalid());
        assert!(Required::new().allow_whitespace().check("   ", &none()).is_valid());
        assert!(Required::new().check("x", &none()).is_valid());
    }

    #[test]
    fn lengths_count_chars_not_bytes() {
        assert!(MinLength::new(3).check("héé", &none()).is_valid());
        assert!(MaxLength::new(3).check("héé", &none()).is_valid());
        assert!(MaxLength::new(2).check("héé", &none()).is_invalid());
    }

    #[test]
    fn min_length_error_interpolates() {
        let result = MinLength::new(5).check("abc", &none());
        let err = result.error().unwrap();
        assert_eq!(err.format_message(), "Must be at least 5 characters");
        assert_eq!(err.params.get("actual").map(String::as_str), Some("3"));
    }

    #[test]
    fn empty_passes_everything_but_required() {
        let values = Values::from([("password".to_string(), "secret".to_string())]);
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(MinLength::new(4)),
            Box::new(MaxLength::new(0)),
            Box::new(Pattern::new(r"^\d+$").unwrap()),
            Box::new(MatchesField::new("password")),
            Box::new(Custom::new("never", "never", |_, _| false)),
        ];
        for rule in &rules {
            assert!(rule.check("", &values).is_valid());
        }
        assert!(Required::new().check("", &values).is_invalid());
    }

    #[test]
    fn pattern_searches_unless_anchored() {
        let loose = Pattern::new(r"\d").unwrap();
        let strict = Pattern::new(r"^\d+$").unwrap();
        assert!(loose.check("a1b", &none()).is_valid());
        assert!(strict.check("a1b", &none()).is_invalid());
        assert_eq!(strict.as_str(), r"^\d+$");
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(Pattern::new("(unclosed").is_err());
    }

    #[test]
    fn matches_field_compares_current_values() {
        let values = Values::from([("password".to_string(), "hunter2".to_string())]);
        let rule = MatchesField::new("password");
        assert!(rule.check("hunter2", &values).is_valid());
        let result = rule.check("hunter3", &values);
        assert_eq!(code(&result), Some(ERROR_CODE_MISMATCH));
        assert_eq!(result.error().unwrap().to_string(), "Must match password");
        assert!(rule.check("x", &none()).is_invalid());
    }

    #[test]
    fn custom_sees_other_values() {
        let rule = Custom::new("taken", "Name is taken", |v, values| {
            values.get("reserved").is_none_or(|r| r != v)
        });
        let values = Values::from([("reserved".to_string(), "admin".to_string())]);
        assert_eq!(code(&rule.check("admin", &values)), Some("taken"));
        assert!(rule.check("alice", &values).is_valid());
    }

    #[test]
    fn with_message_keeps_code_and_params() {
        let rule = MinLength::new(8).with_message("Use {min}+ characters");
        let result = rule.check("short", &none());
        let err = result.error().unwrap();
        assert_eq!(err.code, ERROR_CODE_MIN_LENGTH);
        assert_eq!(err.to_string(), "Use 8+ characters");
    }

    #[test]
    fn rules_report_first_failure_only() {
        let rules = Rules::new().required().min_length(2).max_length(4);
        assert_eq!(code(&rules.check("", &none())), Some(ERROR_CODE_REQUIRED));
        assert_eq!(code(&rules.check("a", &none())), Some(ERROR_CODE_MIN_LENGTH));
        assert_eq!(code(&rules.check("abcde", &none())), Some(ERROR_CODE_MAX_LENGTH));
        assert!(rules.check("abc", &none()).is_valid());
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn empty_rules_accept_anything() {
        let rules = Rules::new();
        assert!(rules.is_empty());
        assert!(rules.check("", &none()).is_valid());
    }

    #[test]
    fn into_error_extracts() {
        assert!(ValidationResult::Valid.into_error().is_none());
        let err = ValidationError::new("x", "y");
        assert_eq!(ValidationResult::Invalid(err.clone()).into_error(), Some(err));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn optional_rules_never_fail_empty(min in 0usize..50, max in 0usize..50) {
                let rules = Rules::new().min_length(min).max_length(max);
                prop_assert!(rules.check("", &Values::new()).is_valid());
            }

            #[test]
            fn length_bounds_agree_with_char_count(s in "\\PC{1,20}", bound in 1usize..25) {
                let len = s.chars().count();
                let values = Values::new();
                prop_assert_eq!(MinLength::new(bound).check(&s, &values).is_valid(), len >= bound);
                prop_assert_eq!(MaxLength::new(bound).check(&s, &values).is_valid(), len <= bound);
            }
        }
    }
}
