#![forbid(unsafe_code)]

//! Typeahead search over item labels.
//!
//! Printable keystrokes accumulate in a buffer that resets after a quiet
//! period. Each keystroke selects the first enabled item, in sequence
//! order, whose label starts with the buffer, ignoring case.
//!
//! # Invariants
//!
//! - A keystroke that matches nothing leaves the buffer as it was; the
//!   previous selection stands.
//! - The buffer is cleared lazily: the first keystroke after the window has
//!   elapsed starts a fresh search.
//! - Disabled items never match.

use web_time::{Duration, Instant};

/// Typeahead configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeaheadConfig {
    /// Quiet period after which the buffer resets.
    pub reset_after: Duration,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            reset_after: Duration::from_millis(500),
        }
    }
}

impl TypeaheadConfig {
    /// Default config (500 ms window).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reset window.
    #[must_use]
    pub fn with_reset_after(mut self, window: Duration) -> Self {
        self.reset_after = window;
        self
    }
}

/// Typeahead search state.
#[derive(Debug, Clone, Default)]
pub struct Typeahead {
    config: TypeaheadConfig,
    buffer: String,
    last_input: Option<Instant>,
}

impl Typeahead {
    /// Create with the given config.
    #[must_use]
    pub fn new(config: TypeaheadConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            last_input: None,
        }
    }

    /// The accumulated search text.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// When the current buffer resets, if it is non-empty.
    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        self.last_input
            .filter(|_| !self.buffer.is_empty())
            .map(|t| t + self.config.reset_after)
    }

    /// Whether the buffer has outlived the window at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }

    /// Drop the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.last_input = None;
    }

    /// Feed one keystroke and search `items` (`(label, disabled)` pairs).
    ///
    /// Returns the index of the matched item. A leading space is ignored so
    /// Space can keep its activation meaning.
    pub fn search<'a, I>(&mut self, ch: char, now: Instant, items: I) -> Option<usize>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        if self.is_expired(now) {
            self.clear();
        }
        if ch == ' ' && self.buffer.is_empty() {
            return None;
        }

        let mut candidate = self.buffer.clone();
        candidate.push(ch);
        let needle = candidate.to_lowercase();

        let found = items
            .into_iter()
            .position(|(label, disabled)| !disabled && label.to_lowercase().starts_with(&needle));

        if found.is_some() {
            self.buffer = candidate;
            self.last_input = Some(now);
        }
        found
    }
}
