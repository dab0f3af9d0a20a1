// logsift - core/filter.rs
//
// Criteria mapping and the conjunctive filter built from it.
// All predicates are AND-combined in the order the criteria were given.
// Core layer: pure logic, no I/O.

use crate::core::model::LogRecord;
use crate::core::predicate::{Predicate, PropPredicate, RegexPredicate, TimeRangePredicate};
use crate::util::constants;
use crate::util::error::FilterError;

/// Named query criteria, kept in insertion order.
///
/// Keys: `keyword` (regex over record text), `time_range` (`"start,end"`),
/// or a record property name (`seq`, `timestamp`, `severity`, `pid`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    entries: Vec<(String, String)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion. Repeating a key adds another predicate; it does not
    /// replace the earlier one.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn keyword(self, pattern: impl Into<String>) -> Self {
        self.with(constants::KEYWORD_KEY, pattern)
    }

    pub fn time_range(self, spec: impl Into<String>) -> Self {
        self.with(constants::TIME_RANGE_KEY, spec)
    }

    /// Parse a `key=value` argument. Only the first '=' separates, so
    /// regex values may contain '='.
    pub fn parse_pair(arg: &str) -> Option<(String, String)> {
        let (key, value) = arg.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Conjunction of predicates. Immutable once built.
#[derive(Debug, Default)]
pub struct Filter {
    predicates: Vec<Box<dyn Predicate>>,
}

impl Filter {
    /// Build every predicate up front so configuration errors surface here
    /// rather than during evaluation.
    pub fn new(criteria: &Criteria) -> Result<Self, FilterError> {
        let predicates = criteria
            .iter()
            .map(|(key, value)| build_predicate(key, value))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(predicates = predicates.len(), "Filter built");
        Ok(Self { predicates })
    }

    /// Returns true if no predicates are active (everything matches).
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Short-circuit AND over all predicates.
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.predicates.iter().all(|p| p.evaluate(record))
    }
}

fn build_predicate(key: &str, value: &str) -> Result<Box<dyn Predicate>, FilterError> {
    Ok(match key {
        constants::KEYWORD_KEY => Box::new(RegexPredicate::new(value)?),
        constants::TIME_RANGE_KEY => Box::new(TimeRangePredicate::new(value)?),
        _ => Box::new(PropPredicate::new(key, value)?),
    })
}
