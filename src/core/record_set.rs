// logsift - core/record_set.rs
//
// Ordered, appendable collection of log records tied to one instance label.
// Owns loading (through the line parser), queries, extraction, and the
// time-ordered merge of two sets.
//
// Query and merge operations never mutate their inputs; they build new sets.

use crate::core::filter::{Criteria, Filter};
use crate::core::model::{Groups, LogRecord};
use crate::core::parser::{self, LoadSummary};
use crate::core::predicate::compile;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{FilterError, MergeError, ParseError};
use regex::Captures;
use serde::Serialize;
use std::io::BufRead;
use std::ops::Index;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    instance: String,
    records: Vec<LogRecord>,
}

impl RecordSet {
    /// Create an empty set labelled `instance`.
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            records: Vec::new(),
        }
    }

    /// Create a set from existing records, kept in the given order.
    pub fn with_records(instance: impl Into<String>, records: Vec<LogRecord>) -> Self {
        Self {
            instance: instance.into(),
            records,
        }
    }

    /// Build a set from one log file, deriving the instance label from the
    /// file name (see [`instance_from_path`]).
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        let instance = instance_from_path(path)?;
        Self::from_file_with_instance(path, instance)
    }

    /// Build a set from one log file with an explicit instance label.
    pub fn from_file_with_instance(
        path: &Path,
        instance: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let mut set = Self::new(instance);
        set.load_file(path)?;
        Ok(set)
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Parse a log file and append its records.
    ///
    /// Sequence numbers continue from the current length of the set.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadSummary, ParseError> {
        tracing::debug!(file = %path.display(), instance = %self.instance, "Loading log file");
        let reader = fs::open_log(path).map_err(|e| ParseError::Io {
            file: path.to_path_buf(),
            source: e,
        })?;
        self.load_reader(reader, path)
    }

    /// Parse any buffered reader and append its records. `source` labels
    /// errors and log output only.
    pub fn load_reader<R: BufRead>(
        &mut self,
        reader: R,
        source: &Path,
    ) -> Result<LoadSummary, ParseError> {
        let next_seq = self.records.len() as u64;
        parser::parse_reader(reader, source, next_seq, &mut self.records)
    }

    // -------------------------------------------------------------------------
    // Collection access
    // -------------------------------------------------------------------------

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LogRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Records matching every criterion, in their original order, as a new
    /// set with the same instance label.
    pub fn filter(&self, criteria: &Criteria) -> Result<RecordSet, FilterError> {
        let filter = Filter::new(criteria)?;
        Ok(self.filter_with(&filter))
    }

    /// Like [`filter`](Self::filter) with a prebuilt [`Filter`].
    pub fn filter_with(&self, filter: &Filter) -> RecordSet {
        let records: Vec<LogRecord> = self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        tracing::debug!(
            instance = %self.instance,
            total = self.records.len(),
            matched = records.len(),
            "Filter applied"
        );
        RecordSet::with_records(self.instance.clone(), records)
    }

    /// Number of records matching every criterion.
    pub fn count(&self, criteria: &Criteria) -> Result<usize, FilterError> {
        let filter = Filter::new(criteria)?;
        Ok(self.records.iter().filter(|r| filter.matches(r)).count())
    }

    // -------------------------------------------------------------------------
    // Extraction
    // -------------------------------------------------------------------------

    /// Captured groups of the first match in each record, in record order.
    /// Records without a match contribute nothing.
    ///
    /// With `multi_line`, `.` also matches newlines.
    pub fn select(&self, pattern: &str, multi_line: bool) -> Result<Vec<Groups>, FilterError> {
        let re = compile(pattern, multi_line)?;
        Ok(self
            .records
            .iter()
            .filter_map(|r| re.captures(&r.original))
            .map(|caps| groups_of(&caps))
            .collect())
    }

    /// Captured groups of the first record that matches, or `None`.
    pub fn select_first(&self, pattern: &str) -> Result<Option<Groups>, FilterError> {
        let re = compile(pattern, false)?;
        Ok(self
            .records
            .iter()
            .find_map(|r| re.captures(&r.original))
            .map(|caps| groups_of(&caps)))
    }

    /// Extract entries split across consecutive records.
    ///
    /// `patterns[i]` must match the i-th record of a run. A run that
    /// completes all patterns yields the concatenated groups of every
    /// section. A record that breaks a run discards it and resets to the
    /// first pattern; that record is not retried as the start of a new run.
    pub fn select_multi_lines<S: AsRef<str>>(
        &self,
        patterns: &[S],
    ) -> Result<Vec<Groups>, FilterError> {
        if patterns.is_empty() {
            return Err(FilterError::EmptySectionList);
        }
        let compiled = patterns
            .iter()
            .map(|p| compile(p.as_ref(), false))
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::new();
        let mut section = 0;
        let mut pending: Groups = Vec::new();

        for record in &self.records {
            match compiled[section].captures(&record.original) {
                Some(caps) => {
                    pending.extend(groups_of(&caps));
                    section += 1;
                    if section == compiled.len() {
                        results.push(std::mem::take(&mut pending));
                        section = 0;
                    }
                }
                None => {
                    section = 0;
                    pending.clear();
                }
            }
        }

        tracing::debug!(
            instance = %self.instance,
            sections = compiled.len(),
            results = results.len(),
            "Section extraction complete"
        );
        Ok(results)
    }

    // -------------------------------------------------------------------------
    // Merge
    // -------------------------------------------------------------------------

    /// Index of the first record whose timestamp is earlier than the one
    /// before it, or `None` when the set is in non-decreasing time order.
    pub fn first_unordered_index(&self) -> Option<usize> {
        self.records
            .windows(2)
            .position(|w| w[1].timestamp() < w[0].timestamp())
            .map(|i| i + 1)
    }

    pub fn is_time_ordered(&self) -> bool {
        self.first_unordered_index().is_none()
    }

    /// Merge two time-ordered sets into a new set labelled with `self`'s
    /// instance.
    ///
    /// Before each record of `self`, every pending record of `other` with
    /// a strictly earlier timestamp is emitted; on equal timestamps the
    /// record of `self` goes first. Both inputs must already be in time
    /// order. This is not checked here (see [`try_merge`](Self::try_merge));
    /// unordered input yields an interleaving that is not globally sorted.
    pub fn merge(&self, other: &RecordSet) -> RecordSet {
        let mut merged = Vec::with_capacity(self.records.len() + other.records.len());
        let mut pending = other.records.iter().peekable();

        for record in &self.records {
            while let Some(earlier) = pending.next_if(|o| o.timestamp() < record.timestamp()) {
                merged.push(earlier.clone());
            }
            merged.push(record.clone());
        }
        merged.extend(pending.cloned());

        tracing::debug!(
            left = %self.instance,
            right = %other.instance,
            records = merged.len(),
            "Record sets merged"
        );
        RecordSet::with_records(self.instance.clone(), merged)
    }

    /// [`merge`](Self::merge) after checking that both sets are time
    /// ordered.
    pub fn try_merge(&self, other: &RecordSet) -> Result<RecordSet, MergeError> {
        for set in [self, other] {
            if let Some(index) = set.first_unordered_index() {
                return Err(MergeError::Unordered {
                    instance: set.instance.clone(),
                    index,
                });
            }
        }
        Ok(self.merge(other))
    }
}

/// Left fold of [`RecordSet::merge`] over `sets`. The result carries the
/// first set's instance label; `None` for an empty input.
pub fn merge_all<I>(sets: I) -> Option<RecordSet>
where
    I: IntoIterator<Item = RecordSet>,
{
    let mut iter = sets.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, next| acc.merge(&next)))
}

/// Validated variant of [`merge_all`].
pub fn try_merge_all<I>(sets: I) -> Result<Option<RecordSet>, MergeError>
where
    I: IntoIterator<Item = RecordSet>,
{
    let mut iter = sets.into_iter();
    let Some(mut acc) = iter.next() else {
        return Ok(None);
    };
    for next in iter {
        acc = acc.try_merge(&next)?;
    }
    Ok(Some(acc))
}

/// Instance label from the file-name convention: the fourth
/// `_`-separated token of the file name, taken as-is.
///
/// `calc_run_20200101_node7_main.log` gives `node7`.
pub fn instance_from_path(path: &Path) -> Result<String, ParseError> {
    fs::file_name_lossy(path)
        .and_then(|name| {
            name.split(constants::INSTANCE_TOKEN_SEPARATOR)
                .nth(constants::INSTANCE_TOKEN_INDEX)
                .map(str::to_string)
        })
        .ok_or_else(|| ParseError::InvalidFileName {
            path: path.to_path_buf(),
        })
}

fn groups_of(caps: &Captures<'_>) -> Groups {
    caps.iter()
        .skip(1)
        .map(|m| m.map(|m| m.as_str().to_string()))
        .collect()
}

impl Index<usize> for RecordSet {
    type Output = LogRecord;

    fn index(&self, index: usize) -> &LogRecord {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a LogRecord;
    type IntoIter = std::slice::Iter<'a, LogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
