//! Event sinks for failures and notable events.
//!
//! The bridge client and the animation engine report every failure to an
//! [`EventSink`] before returning it. Sinks only observe; they never change
//! the error that is propagated.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use log::Level;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Component that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Bridge,
    Engine,
}

/// A single reported event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub level: Level,
    pub source: Source,
    pub message: String,
}

impl Event {
    pub fn error(source: Source, message: impl Into<String>) -> Self {
        Event {
            level: Level::Error,
            source,
            message: message.into(),
        }
    }

    pub fn warn(source: Source, message: impl Into<String>) -> Self {
        Event {
            level: Level::Warn,
            source,
            message: message.into(),
        }
    }

    pub fn info(source: Source, message: impl Into<String>) -> Self {
        Event {
            level: Level::Info,
            source,
            message: message.into(),
        }
    }

    pub fn debug(source: Source, message: impl Into<String>) -> Self {
        Event {
            level: Level::Debug,
            source,
            message: message.into(),
        }
    }
}

/// Destination for reported events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &Event);
}

/// Forwards events to the [`log`] facade under the `hue_animator::<source>` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: &Event) {
        let target = match event.source {
            Source::Bridge => "hue_animator::bridge",
            Source::Engine => "hue_animator::engine",
        };
        log::log!(target: target, event.level, "{}", event.message);
    }
}

/// A recorded event in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub level: String,
    pub source: Source,
    pub message: String,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Bounded in-memory event history.
///
/// Keeps the most recent `max_entries` events; older ones are dropped.
/// Per-level counts cover everything ever recorded.
#[derive(Debug)]
pub struct EventHistory {
    inner: Mutex<Inner>,
    start_time: Instant,
    max_entries: usize,
}

#[derive(Debug, Default)]
struct Inner {
    counts: HashMap<Level, usize>,
    last_error: Option<String>,
    entries: Vec<HistoryEntry>,
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            start_time: Instant::now(),
            max_entries,
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().entries.clone()
    }

    /// Number of events recorded at `level`, including dropped ones.
    pub fn count(&self, level: Level) -> usize {
        self.lock().counts.get(&level).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.counts.clear();
        inner.entries.clear();
        inner.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        let inner = self.lock();
        let count = |level: Level| inner.counts.get(&level).copied().unwrap_or(0);
        HistorySummary {
            error_count: count(Level::Error),
            warn_count: count(Level::Warn),
            info_count: count(Level::Info),
            total_entries: inner.entries.len(),
            last_error: inner.last_error.clone(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the history usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for EventHistory {
    fn record(&self, event: &Event) {
        let timestamp = self.start_time.elapsed().as_secs_f64();
        let mut inner = self.lock();

        *inner.counts.entry(event.level).or_default() += 1;
        if event.level == Level::Error {
            inner.last_error = Some(event.message.clone());
        }

        inner.entries.push(HistoryEntry {
            level: event.level.to_string(),
            source: event.source,
            message: event.message.clone(),
            timestamp,
        });

        if inner.entries.len() > self.max_entries {
            inner.entries.remove(0);
        }
    }
}

/// Summary of event history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub error_count: usize,
    pub warn_count: usize,
    pub info_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}
