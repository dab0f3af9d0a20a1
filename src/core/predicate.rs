// logsift - core/predicate.rs
//
// Boolean tests over a single log record. Each predicate validates its
// configuration when it is built, so evaluation itself cannot fail.
// Core layer: pure logic, no I/O.

use crate::core::model::{LogRecord, PropName, PropValue};
use crate::core::parser::parse_boundary_timestamp;
use crate::util::error::FilterError;
use chrono::NaiveDateTime;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// A pure test over one record. Implementations must not mutate state.
pub trait Predicate: fmt::Debug {
    fn evaluate(&self, record: &LogRecord) -> bool;
}

// =============================================================================
// Property equality
// =============================================================================

/// Equality test against one of the record's header properties.
#[derive(Debug, Clone)]
pub struct PropPredicate {
    expected: PropValue,
}

impl PropPredicate {
    /// Build from a criteria key and its raw value.
    ///
    /// Fails if `name` is not a record property or `value` cannot be read
    /// as that property's type.
    pub fn new(name: &str, value: &str) -> Result<Self, FilterError> {
        let prop = PropName::from_key(name).ok_or_else(|| FilterError::UnknownProperty {
            name: name.to_string(),
        })?;
        Ok(Self {
            expected: parse_prop_value(prop, value)?,
        })
    }
}

impl Predicate for PropPredicate {
    fn evaluate(&self, record: &LogRecord) -> bool {
        record.props.matches(&self.expected)
    }
}

fn parse_prop_value(prop: PropName, raw: &str) -> Result<PropValue, FilterError> {
    let invalid = |expected: &'static str| FilterError::InvalidPropValue {
        name: prop.key(),
        value: raw.to_string(),
        expected,
    };
    // Surrounding whitespace is never part of a header field.
    let value = raw.trim();
    match prop {
        PropName::Seq => value
            .parse()
            .map(PropValue::Seq)
            .map_err(|_| invalid("a non-negative integer")),
        PropName::Pid => value
            .parse()
            .map(PropValue::Pid)
            .map_err(|_| invalid("a process id")),
        PropName::Timestamp => parse_boundary_timestamp(value)
            .map(PropValue::Timestamp)
            .ok_or_else(|| invalid("a recognised timestamp")),
        PropName::Severity => Ok(PropValue::Severity(value.to_string())),
    }
}

// =============================================================================
// Regex search
// =============================================================================

/// True when the pattern matches anywhere in the record's text.
#[derive(Debug, Clone)]
pub struct RegexPredicate {
    pattern: Regex,
}

impl RegexPredicate {
    pub fn new(pattern: &str) -> Result<Self, FilterError> {
        Ok(Self {
            pattern: compile(pattern, false)?,
        })
    }
}

impl Predicate for RegexPredicate {
    fn evaluate(&self, record: &LogRecord) -> bool {
        self.pattern.is_match(&record.original)
    }
}

/// Compile a user-supplied pattern, keeping the pattern text in the error.
/// With `dot_matches_new_line`, `.` also matches '\n' so a pattern can span
/// the lines of a multi-line record.
pub(crate) fn compile(pattern: &str, dot_matches_new_line: bool) -> Result<Regex, FilterError> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(dot_matches_new_line)
        .build()
        .map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })
}

// =============================================================================
// Time range
// =============================================================================

/// Exclusive time window: `start < timestamp < end`, either bound optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangePredicate {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl TimeRangePredicate {
    /// Parse a `"start,end"` spec. Either side may be empty.
    ///
    /// Bounds in the record header format contain a comma themselves, so
    /// every comma is tried as the separator and the first split where both
    /// sides are valid wins.
    pub fn new(spec: &str) -> Result<Self, FilterError> {
        let mut last_err = None;
        for (idx, _) in spec.match_indices(',') {
            match (parse_bound(spec, &spec[..idx]), parse_bound(spec, &spec[idx + 1..])) {
                (Ok(start), Ok(end)) => return Ok(Self { start, end }),
                (Err(e), _) | (_, Err(e)) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| FilterError::InvalidTimeRange {
            spec: spec.to_string(),
            reason: "expected 'start,end' (either side may be empty)".to_string(),
        }))
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }
}

fn parse_bound(spec: &str, raw: &str) -> Result<Option<NaiveDateTime>, FilterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_boundary_timestamp(raw)
        .map(Some)
        .ok_or_else(|| FilterError::InvalidTimeRange {
            spec: spec.to_string(),
            reason: format!("cannot parse '{raw}' as a timestamp"),
        })
}

impl Predicate for TimeRangePredicate {
    fn evaluate(&self, record: &LogRecord) -> bool {
        let ts = record.timestamp();
        let after_start = self.start.map_or(true, |start| start < ts);
        let before_end = self.end.map_or(true, |end| ts < end);
        after_start && before_end
    }
}
