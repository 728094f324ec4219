//! Event log
//!
//! Append-only record of alerts, toasts, recommendations and intervention
//! warnings. Entries are never modified after they are appended. The only
//! removal is retention: once `capacity` entries exist, the oldest is evicted.

use crate::types::{Alert, Recommendation, Toast};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Something worth recording for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEvent {
    Alert(Alert),
    Toast(Toast),
    Recommendation(Recommendation),
    /// A degraded outcome, e.g. a failed intervention
    Warning { timestamp: f64, cause: String },
}

impl LogEvent {
    pub fn timestamp(&self) -> f64 {
        match self {
            LogEvent::Alert(alert) => alert.timestamp,
            LogEvent::Toast(toast) => toast.timestamp,
            LogEvent::Recommendation(rec) => rec.timestamp,
            LogEvent::Warning { timestamp, .. } => *timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LogEvent::Alert(_) => "alert",
            LogEvent::Toast(_) => "toast",
            LogEvent::Recommendation(_) => "recommendation",
            LogEvent::Warning { .. } => "warning",
        }
    }
}

/// Immutable log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// Position in the log since creation, gaps mark evicted entries
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: LogEvent,
}

#[derive(Debug)]
struct Entries {
    items: VecDeque<LogEntry>,
    next_sequence: u64,
}

/// Bounded, thread-safe event log
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(Entries {
                items: VecDeque::with_capacity(capacity),
                next_sequence: 0,
            }),
        }
    }

    /// Record an event and return the stored entry
    pub fn append(&self, event: LogEvent) -> LogEntry {
        let recorded_at = Utc::now();
        let id = Uuid::new_v4();

        let mut entries = self.entries.write();
        let entry = LogEntry {
            id,
            sequence: entries.next_sequence,
            recorded_at,
            event,
        };
        entries.next_sequence += 1;
        if entries.items.len() == self.capacity {
            entries.items.pop_front();
        }
        entries.items.push_back(entry.clone());
        entry
    }

    /// The `n` most recent entries, newest first
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        self.entries.read().items.iter().rev().take(n).cloned().collect()
    }

    /// Most recent recommendation still retained
    pub fn last_recommendation(&self) -> Option<Recommendation> {
        self.entries
            .read()
            .items
            .iter()
            .rev()
            .find_map(|entry| match &entry.event {
                LogEvent::Recommendation(rec) => Some(rec.clone()),
                _ => None,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries ever appended, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.entries.read().next_sequence
    }
}
