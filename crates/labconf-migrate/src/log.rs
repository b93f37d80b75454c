//! Migration log
//!
//! Every soft condition and applied step is recorded here and returned with
//! the migration result. Each entry is mirrored to `tracing` at its level.

use crate::family::Family;
use std::fmt;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Progress
    Info,
    /// Soft condition; migration continues
    Warn,
    /// Fatal condition; migration halted
    Error,
}

/// What a log entry reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A step was applied
    Step,
    /// File missing or not a JSON mapping
    Unreadable,
    /// Tag or shape validation failed
    Validation,
    /// An entity reference did not resolve
    DanglingReference,
    /// Any other warning raised by a step
    Notice,
    /// The chain halted
    Fatal,
}

/// One log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity
    pub level: Level,
    /// Category
    pub kind: EntryKind,
    /// Human-readable text
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Accumulated log of one or more migrations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationLog {
    entries: Vec<LogEntry>,
}

impl MigrationLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied step: `"<family>: version <v> to <v+1>"`
    pub fn step(&mut self, family: Family, from: u32) {
        self.push(
            Level::Info,
            EntryKind::Step,
            format!("{family}: version {from} to {}", from + 1),
        );
    }

    /// Record an unreadable document
    pub fn unreadable(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, EntryKind::Unreadable, message.into());
    }

    /// Record a validation failure
    pub fn validation(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, EntryKind::Validation, message.into());
    }

    /// Record a dangling entity reference
    pub fn dangling(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, EntryKind::DanglingReference, message.into());
    }

    /// Record a step warning
    pub fn notice(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, EntryKind::Notice, message.into());
    }

    /// Record the fatal condition that halted the chain
    pub fn fatal(&mut self, message: impl Into<String>) {
        self.push(Level::Error, EntryKind::Fatal, message.into());
    }

    fn push(&mut self, level: Level, kind: EntryKind, message: String) {
        match level {
            Level::Info => tracing::info!(?kind, "{}", message),
            Level::Warn => tracing::warn!(?kind, "{}", message),
            Level::Error => tracing::error!(?kind, "{}", message),
        }
        self.entries.push(LogEntry { level, kind, message });
    }

    /// Append another log
    pub fn extend(&mut self, other: MigrationLog) {
        self.entries.extend(other.entries);
    }

    /// All entries, in order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entry messages, in order
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    /// Entries of one kind
    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Check if any entry has the given kind
    #[must_use]
    pub fn contains_kind(&self, kind: EntryKind) -> bool {
        self.of_kind(kind).next().is_some()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if log is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for MigrationLog {
    type Item = LogEntry;
    type IntoIter = std::vec::IntoIter<LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
