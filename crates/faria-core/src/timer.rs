#![forbid(unsafe_code)]

//! Cancellable, reschedulable deadlines keyed by id.
//!
//! The primitives never register host timer callbacks themselves. They
//! record deadlines in a [`Timers`] map and the host event loop calls
//! [`Timers::poll`] (typically when a single host timer armed for
//! [`Timers::next_deadline`] fires). This keeps expiry deterministic and
//! makes "cancel", "reschedule" and "tear everything down" plain map
//! operations.
//!
//! # Invariants
//!
//! - At most one pending deadline per key; scheduling again replaces it.
//! - Cancelling or firing one key never changes another key's deadline.
//! - `poll` returns expired keys ordered by deadline, ties broken by the
//!   order in which they were scheduled.

use std::collections::HashMap;
use std::hash::Hash;

use web_time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Pending {
    deadline: Instant,
    seq: u64,
}

/// Deadline map keyed by `K`.
#[derive(Debug, Clone)]
pub struct Timers<K> {
    pending: HashMap<K, Pending>,
    next_seq: u64,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> Timers<K> {
    /// Create an empty timer map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire `delay` after `now`, replacing any pending deadline.
    ///
    /// Returns `true` if an existing deadline was replaced.
    pub fn schedule(&mut self, key: K, now: Instant, delay: Duration) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending
            .insert(
                key,
                Pending {
                    deadline: now + delay,
                    seq,
                },
            )
            .is_some()
    }

    /// Disarm `key`. Returns `true` if it was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Whether `key` has a pending deadline.
    #[must_use]
    pub fn is_scheduled(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// The pending deadline for `key`.
    #[must_use]
    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.pending.get(key).map(|p| p.deadline)
    }

    /// Time left before `key` fires, saturating at zero.
    #[must_use]
    pub fn remaining(&self, key: &K, now: Instant) -> Option<Duration> {
        self.deadline(key)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// The earliest pending deadline, for arming a single host timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Remove and return every key whose deadline is at or before `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<K> {
        let mut expired: Vec<(K, Pending)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, p)| (k.clone(), *p))
            .collect();
        expired.sort_by_key(|(_, p)| (p.deadline, p.seq));
        for (key, _) in &expired {
            self.pending.remove(key);
        }
        expired.into_iter().map(|(key, _)| key).collect()
    }

    /// Number of pending deadlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Disarm everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
