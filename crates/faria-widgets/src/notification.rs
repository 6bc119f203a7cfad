#![forbid(unsafe_code)]

//! Bounded, auto-expiring notification queue with a live-region announcer.
//!
//! Notifications enter at the tail. When the queue is full, the head (the
//! oldest notification) is evicted to make room, so the visible set is always
//! the most recent `max_visible` entries. Each entry with a time-to-live has
//! its own deadline in a [`Timers`] map; the host calls
//! [`NotificationQueue::tick`] when [`NotificationQueue::next_deadline`] is
//! reached.
//!
//! # Invariants
//!
//! - `len() <= max_visible` after every operation.
//! - Ids are unique and increase with creation order.
//! - Expiring, dismissing or hovering one entry never moves another entry's
//!   deadline.
//! - A dismissed or evicted entry never expires later: its timer is
//!   cancelled with it.
//! - The announcement carries only the title of the most recently enqueued
//!   entry.
//!
//! # Example
//!
//! ```
//! use faria_widgets::notification::{NotificationQueue, NotificationRequest, QueueConfig};
//! use web_time::Instant;
//!
//! let now = Instant::now();
//! let mut queue = NotificationQueue::new(QueueConfig::new().max_visible(3));
//! for title in ["A", "B", "C", "D"] {
//!     queue.enqueue(NotificationRequest::info(title), now);
//! }
//! let titles: Vec<_> = queue.visible().map(|n| n.title.as_str()).collect();
//! assert_eq!(titles, ["B", "C", "D"]);
//! ```

use std::collections::VecDeque;

use faria_core::motion::{Motion, MotionPreference};
use faria_core::timer::Timers;
use web_time::{Duration, Instant};

use crate::aria::{AriaAttrs, Politeness};

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationKind {
    /// Informational.
    #[default]
    Info,
    /// Something succeeded.
    Success,
    /// Something needs attention.
    Warning,
    /// Something failed.
    Error,
}

impl NotificationKind {
    /// Display character for the kind's icon.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Info => 'i',
            Self::Success => '\u{2713}', // ✓
            Self::Warning => '!',
            Self::Error => '\u{2717}', // ✗
        }
    }

    /// ASCII fallback for the icon.
    #[must_use]
    pub const fn as_ascii(self) -> char {
        match self {
            Self::Info => 'i',
            Self::Success => '+',
            Self::Warning => '!',
            Self::Error => 'x',
        }
    }

    /// How urgently assistive technology should announce it.
    #[must_use]
    pub const fn politeness(self) -> Politeness {
        match self {
            Self::Error => Politeness::Assertive,
            _ => Politeness::Polite,
        }
    }
}

/// Requested time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the queue's default.
    #[default]
    Default,
    /// Expire after this long.
    After(Duration),
    /// Stay until dismissed.
    Never,
}

impl Ttl {
    /// Interpret a signed millisecond count: zero or negative never expires.
    #[must_use]
    pub fn from_millis(ms: i64) -> Self {
        match u64::try_from(ms) {
            Ok(ms) if ms > 0 => Self::After(Duration::from_millis(ms)),
            _ => Self::Never,
        }
    }

    fn resolve(self, default: Duration) -> Option<Duration> {
        match self {
            Self::Default => Some(default).filter(|d| !d.is_zero()),
            Self::After(d) => Some(d).filter(|d| !d.is_zero()),
            Self::Never => None,
        }
    }
}

/// Content for a new notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Severity.
    pub kind: NotificationKind,
    /// Headline; also what gets announced.
    pub title: String,
    /// Optional body text.
    pub detail: Option<String>,
    /// Time-to-live.
    pub ttl: Ttl,
}

impl NotificationRequest {
    /// A request with the queue's default time-to-live.
    #[must_use]
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: None,
            ttl: Ttl::Default,
        }
    }

    /// Informational notification.
    #[must_use]
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title)
    }

    /// Success notification.
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title)
    }

    /// Warning notification.
    #[must_use]
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title)
    }

    /// Error notification.
    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title)
    }

    /// Attach body text.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Expire after `ttl`.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Ttl::After(ttl);
        self
    }

    /// Never expire.
    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.ttl = Ttl::Never;
        self
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Identifier.
    pub id: NotificationId,
    /// Severity.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub detail: Option<String>,
    /// Resolved time-to-live; `None` never expires.
    pub ttl: Option<Duration>,
    /// Whether the pointer is over it (timer suspended).
    pub hovered: bool,
}

/// Queue configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueConfig {
    /// Maximum number of entries held at once (at least 1).
    pub max_visible: usize,
    /// Time-to-live for requests using [`Ttl::Default`]. Zero disables
    /// expiry.
    pub default_ttl: Duration,
    /// Countdown used when hover ends. `None` (or zero) restarts the
    /// entry's full TTL.
    pub hover_restart: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_visible: 3,
            default_ttl: Duration::from_secs(5),
            hover_restart: None,
        }
    }
}

impl QueueConfig {
    /// Default config: 3 visible, 5 s TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity (clamped to at least 1).
    #[must_use]
    pub fn max_visible(mut self, max: usize) -> Self {
        self.max_visible = max.max(1);
        self
    }

    /// Set the default time-to-live.
    #[must_use]
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Use a shorter countdown after hover ends. Zero means the full TTL.
    #[must_use]
    pub fn hover_restart(mut self, restart: Duration) -> Self {
        self.hover_restart = Some(restart).filter(|r| !r.is_zero());
        self
    }
}

/// Text for the live region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// What to announce.
    pub text: String,
    /// How urgently.
    pub politeness: Politeness,
    /// Id of the notification it came from.
    pub source: NotificationId,
}

/// Bounded FIFO of notifications.
#[derive(Debug)]
pub struct NotificationQueue {
    config: QueueConfig,
    entries: VecDeque<Notification>,
    timers: Timers<NotificationId>,
    next_id: u64,
    announcement: Option<Announcement>,
    motion: MotionPreference,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl NotificationQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config: QueueConfig {
                max_visible: config.max_visible.max(1),
                hover_restart: config.hover_restart.filter(|r| !r.is_zero()),
                ..config
            },
            entries: VecDeque::new(),
            timers: Timers::new(),
            next_id: 1,
            announcement: None,
            motion: MotionPreference::default(),
        }
    }

    /// Share a reduced-motion preference with the presentation layer.
    #[must_use]
    pub fn with_motion(mut self, motion: MotionPreference) -> Self {
        self.motion = motion;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Animated or instant presentation. Never affects timing.
    #[must_use]
    pub fn motion(&self) -> Motion {
        self.motion.motion()
    }

    /// Add a notification at the tail, evicting the head if full.
    pub fn enqueue(&mut self, request: NotificationRequest, now: Instant) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        let ttl = request.ttl.resolve(self.config.default_ttl);

        self.announcement = Some(Announcement {
            text: request.title.clone(),
            politeness: request.kind.politeness(),
            source: id,
        });
        self.entries.push_back(Notification {
            id,
            kind: request.kind,
            title: request.title,
            detail: request.detail,
            ttl,
            hovered: false,
        });
        if let Some(ttl) = ttl {
            self.timers.schedule(id, now, ttl);
        }
        faria_core::debug!(
            id = id.raw(),
            ttl_ms = ?ttl.map(|d| d.as_millis()),
            "notification enqueued"
        );

        self.evict_overflow();
        id
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.config.max_visible {
            if let Some(evicted) = self.entries.pop_front() {
                self.timers.cancel(&evicted.id);
                faria_core::debug!(id = evicted.id.raw(), "notification evicted");
            }
        }
    }

    /// Remove a notification now. Returns `false` if it is already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.timers.cancel(&id);
        match self.entries.iter().position(|n| n.id == id) {
            Some(index) => {
                self.entries.remove(index);
                faria_core::debug!(id = id.raw(), "notification dismissed");
                true
            }
            None => {
                faria_core::trace!(id = id.raw(), "dismiss of absent notification ignored");
                false
            }
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.timers.clear();
    }

    /// Pointer entered a notification: suspend its timer.
    pub fn hover_start(&mut self, id: NotificationId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        entry.hovered = true;
        self.timers.cancel(&id);
        true
    }

    /// Pointer left a notification: start a fresh countdown.
    pub fn hover_end(&mut self, id: NotificationId, now: Instant) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        entry.hovered = false;
        if let Some(ttl) = entry.ttl {
            let restart = self.config.hover_restart.map_or(ttl, |r| r.min(ttl));
            self.timers.schedule(id, now, restart);
        }
        true
    }

    /// Remove every entry whose deadline has passed. Returns their ids in
    /// expiry order.
    pub fn tick(&mut self, now: Instant) -> Vec<NotificationId> {
        let expired = self.timers.poll(now);
        if !expired.is_empty() {
            self.entries.retain(|n| !expired.contains(&n.id));
            faria_core::debug!(count = expired.len(), "notifications expired");
        }
        expired
    }

    /// When the host should next call [`NotificationQueue::tick`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Time left before `id` expires. `None` if it never expires, is
    /// hovered, or is gone.
    #[must_use]
    pub fn remaining(&self, id: NotificationId, now: Instant) -> Option<Duration> {
        self.timers.remaining(&id, now)
    }

    /// Change the capacity, evicting from the head if needed.
    pub fn set_max_visible(&mut self, max: usize) {
        self.config.max_visible = max.max(1);
        self.evict_overflow();
    }

    /// Entries, oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// What the live region should say.
    #[must_use]
    pub fn announcement(&self) -> Option<&Announcement> {
        self.announcement.as_ref()
    }

    /// Attributes for the single live region. The politeness follows the
    /// latest announcement.
    #[must_use]
    pub fn live_region_attrs(&self) -> AriaAttrs {
        let politeness = self
            .announcement
            .as_ref()
            .map_or(Politeness::Polite, |a| a.politeness);
        let role = match politeness {
            Politeness::Assertive => "alert",
            Politeness::Polite => "status",
        };
        AriaAttrs::new().role(role).live(politeness).atomic(true)
    }
}
