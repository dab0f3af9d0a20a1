// logsift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Captured groups of one regex match, one slot per group.
/// `None` marks a group that did not participate in the match.
pub type Groups = Vec<Option<String>>;

// =============================================================================
// Record properties
// =============================================================================

/// Parsed header fields of a log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordProps {
    /// Position of the record within the set that parsed it (0-based).
    pub seq: u64,

    /// Header timestamp, millisecond precision, no timezone.
    pub timestamp: NaiveDateTime,

    /// Severity token exactly as written (e.g. "INFO").
    pub severity: String,

    /// Process id from the bracketed header field.
    pub pid: u32,
}

impl RecordProps {
    /// Compare one property against an expected value without cloning.
    pub fn matches(&self, expected: &PropValue) -> bool {
        match expected {
            PropValue::Seq(v) => self.seq == *v,
            PropValue::Timestamp(v) => self.timestamp == *v,
            PropValue::Severity(v) => self.severity == *v,
            PropValue::Pid(v) => self.pid == *v,
        }
    }
}

// =============================================================================
// Property names and values
// =============================================================================

/// The closed set of record properties a criteria key may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropName {
    Seq,
    Timestamp,
    Severity,
    Pid,
}

impl PropName {
    /// Returns all variants in declaration order.
    pub fn all() -> &'static [PropName] {
        &[
            PropName::Seq,
            PropName::Timestamp,
            PropName::Severity,
            PropName::Pid,
        ]
    }

    /// Criteria key for this property.
    pub fn key(&self) -> &'static str {
        match self {
            PropName::Seq => "seq",
            PropName::Timestamp => "timestamp",
            PropName::Severity => "severity",
            PropName::Pid => "pid",
        }
    }

    /// Look up a property by its criteria key. Matching is exact.
    pub fn from_key(key: &str) -> Option<PropName> {
        Self::all().iter().copied().find(|p| p.key() == key)
    }
}

impl fmt::Display for PropName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A typed property value, used as the expected side of an equality test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Seq(u64),
    Timestamp(NaiveDateTime),
    Severity(String),
    Pid(u32),
}

// =============================================================================
// Log record
// =============================================================================

/// A single reconstructed log record: one header line plus any
/// continuation lines that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub props: RecordProps,

    /// Message text of the header line, followed by continuation lines
    /// joined with '\n'.
    pub original: String,
}

impl LogRecord {
    pub fn new(
        seq: u64,
        timestamp: NaiveDateTime,
        severity: impl Into<String>,
        pid: u32,
        line: impl Into<String>,
    ) -> Self {
        Self {
            props: RecordProps {
                seq,
                timestamp,
                severity: severity.into(),
                pid,
            },
            original: line.into(),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.props.timestamp
    }

    /// Attach a continuation line. Only the parser calls this, and only on
    /// the record it created most recently.
    pub(crate) fn push_continuation(&mut self, line: &str) {
        self.original.push('\n');
        self.original.push_str(line);
    }
}

/// Canonical rendering: `00042 2020-01-01T00:00:00.100 <original>`.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:05} {} {}",
            self.props.seq,
            self.props
                .timestamp
                .format(constants::RENDER_TIMESTAMP_FORMAT),
            self.original
        )
    }
}
