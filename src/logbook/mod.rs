use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub const SYSTEM_SOURCE: &str = "SYSTEM";
pub const USER_SOURCE: &str = "USER";

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogId(u64);

impl LogId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    System,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::System => "system",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub timestamp: DateTime<Local>,
    pub source: String,
    pub severity: Severity,
    pub message: String,
}

/// Bounded, append-only log. Oldest entries are evicted before an append would
/// exceed the capacity, so `len() <= capacity()` always holds.
#[derive(Debug, Clone)]
pub struct LogBook {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl LogBook {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn push(
        &mut self,
        timestamp: DateTime<Local>,
        source: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> LogId {
        let id = LogId::new(self.next_id);
        self.next_id += 1;

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(LogEntry {
            id,
            timestamp,
            source: source.into(),
            severity,
            message: message.into(),
        });
        id
    }

    /// Drops every entry. Ids keep counting so a renderer can tell old from new.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Entries appended after `id`, oldest first.
    pub fn since(&self, id: Option<LogId>) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(move |entry| id.is_none_or(|seen| entry.id > seen))
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for LogBook {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
