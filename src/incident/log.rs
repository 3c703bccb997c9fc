use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced an operations-log entry. Failure kinds render with their
/// own prefix so the log reads as an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogEntryKind {
    Diagnosis,
    Plan,
    StatusCheck,
    ExecutionSuccess,
    ExecutionFailed,
    ExecutionBlocked,
    UnknownAction,
    OperatorMessage,
    OperatorBlocked,
    OracleReply,
    Notice,
}

impl LogEntryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Diagnosis => "Diagnosis",
            Self::Plan => "Proposed Plan",
            Self::StatusCheck => "Live Status Check",
            Self::ExecutionSuccess => "Execution Success",
            Self::ExecutionFailed => "Execution Failed",
            Self::ExecutionBlocked => "Execution Blocked",
            Self::UnknownAction => "Unknown Action",
            Self::OperatorMessage => "Operator",
            Self::OperatorBlocked => "Operator Request Blocked",
            Self::OracleReply => "Agent",
            Self::Notice => "Notice",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::ExecutionFailed | Self::ExecutionBlocked | Self::UnknownAction | Self::OperatorBlocked
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogEntryKind,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: LogEntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Same kind and text; the timestamp is not part of identity.
    pub fn same_content(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.text)
    }
}

/// Append-only record of everything the workflow did for one incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationLog {
    entries: Vec<LogEntry>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: LogEntryKind, text: impl Into<String>) {
        self.entries.push(LogEntry::new(kind, text));
    }

    /// Append unless the most recent entry already says the same thing.
    /// Returns whether an entry was appended.
    pub fn push_unless_last(&mut self, kind: LogEntryKind, text: impl Into<String>) -> bool {
        let entry = LogEntry::new(kind, text);
        if self.last().is_some_and(|last| last.same_content(&entry)) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn count_kind(&self, kind: LogEntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
