// logsift - core/parser.rs
//
// Line-oriented reconstruction of log records.
// Core layer: accepts BufRead trait objects, never touches the filesystem
// directly.
//
// The automaton has two states, "no current record" and "has current
// record". A header line always starts a new record; any other non-blank
// line is appended to the current record, or dropped when there is none.

use crate::core::model::LogRecord;
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::NaiveDateTime;
use regex::Regex;
use std::io::BufRead;
use std::path::Path;
use std::sync::OnceLock;

/// Counters describing one load operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Physical lines read, blank ones included.
    pub lines_read: u64,
    /// Lines that were empty after trimming.
    pub blank_lines: u64,
    /// Header lines that became new records.
    pub records_added: u64,
    /// Lines appended to the current record.
    pub continuation_lines: u64,
    /// Non-header lines seen before the first header; discarded.
    pub orphan_lines: u64,
    /// Header-shaped lines whose timestamp or pid could not be converted.
    /// These are handled like continuation lines.
    pub malformed_headers: u64,
}

/// Compiled header pattern, shared by every parser.
fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant covered by the unit tests below.
    HEADER.get_or_init(|| Regex::new(constants::HEADER_PATTERN).expect("invalid header pattern"))
}

/// The fields of a successfully parsed header line.
#[derive(Debug, PartialEq, Eq)]
struct Header<'a> {
    timestamp: NaiveDateTime,
    severity: &'a str,
    pid: u32,
    message: &'a str,
}

/// Outcome of testing one trimmed line against the header pattern.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Header(Header<'a>),
    /// Matched the pattern but the timestamp or pid did not convert.
    MalformedHeader,
    Text,
}

fn classify(line: &str) -> LineKind<'_> {
    let Some(caps) = header_regex().captures(line) else {
        return LineKind::Text;
    };
    // All four groups are mandatory in the pattern.
    let (Some(ts), Some(severity), Some(pid), Some(message)) =
        (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
    else {
        return LineKind::Text;
    };

    let timestamp = match parse_header_timestamp(ts.as_str()) {
        Some(t) => t,
        None => return LineKind::MalformedHeader,
    };
    let pid = match pid.as_str().parse::<u32>() {
        Ok(p) => p,
        Err(_) => return LineKind::MalformedHeader,
    };

    LineKind::Header(Header {
        timestamp,
        severity: severity.as_str(),
        pid,
        message: message.as_str(),
    })
}

// =============================================================================
// Line automaton
// =============================================================================

/// Feeds raw lines into a record vector, one load operation at a time.
///
/// The parser appends to the vector it is handed; the current record is
/// always the last element, and only while `has_current` is set.
#[derive(Debug)]
pub struct LineParser {
    next_seq: u64,
    has_current: bool,
    summary: LoadSummary,
}

impl LineParser {
    /// Start a load whose first record receives sequence number `next_seq`.
    pub fn new(next_seq: u64) -> Self {
        Self {
            next_seq,
            has_current: false,
            summary: LoadSummary::default(),
        }
    }

    /// Process one physical line. Surrounding whitespace (including a
    /// trailing `\r`) is removed before matching.
    pub fn feed(&mut self, raw_line: &str, records: &mut Vec<LogRecord>) {
        self.summary.lines_read += 1;
        let line = raw_line.trim();
        if line.is_empty() {
            self.summary.blank_lines += 1;
            return;
        }

        match classify(line) {
            LineKind::Header(h) => {
                records.push(LogRecord::new(
                    self.next_seq,
                    h.timestamp,
                    h.severity,
                    h.pid,
                    h.message,
                ));
                self.next_seq += 1;
                self.has_current = true;
                self.summary.records_added += 1;
            }
            kind => {
                if kind == LineKind::MalformedHeader {
                    self.summary.malformed_headers += 1;
                    tracing::debug!(
                        line = self.summary.lines_read,
                        "Header-shaped line with invalid timestamp or pid, treated as text"
                    );
                }
                self.append_continuation(line, records);
            }
        }
    }

    fn append_continuation(&mut self, line: &str, records: &mut [LogRecord]) {
        match records.last_mut() {
            Some(current) if self.has_current => {
                current.push_continuation(line);
                self.summary.continuation_lines += 1;
            }
            _ => {
                self.summary.orphan_lines += 1;
                tracing::trace!(line = self.summary.lines_read, "Dropped line before first header");
            }
        }
    }

    pub fn finish(self) -> LoadSummary {
        self.summary
    }
}

/// Run a whole reader through a fresh [`LineParser`].
///
/// Invalid UTF-8 is replaced line by line, so a bad byte sequence never
/// aborts the load. `source` is only used to label I/O errors.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    source: &Path,
    next_seq: u64,
    records: &mut Vec<LogRecord>,
) -> Result<LoadSummary, ParseError> {
    let mut parser = LineParser::new(next_seq);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ParseError::Io {
                file: source.to_path_buf(),
                source: e,
            })?;
        if n == 0 {
            break;
        }
        parser.feed(&String::from_utf8_lossy(&buf), records);
    }

    let summary = parser.finish();
    tracing::debug!(
        file = %source.display(),
        lines = summary.lines_read,
        records = summary.records_added,
        continuation = summary.continuation_lines,
        orphans = summary.orphan_lines,
        malformed = summary.malformed_headers,
        "Parsing complete"
    );
    Ok(summary)
}

// =============================================================================
// Timestamp parsing
// =============================================================================

/// Parse the timestamp of a header line (`01 Jan 2020, 00:00:00.100`).
pub fn parse_header_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, constants::HEADER_TIMESTAMP_FORMAT).ok()
}

/// Parse a user-supplied timestamp used as a filter bound or a `timestamp`
/// criteria value. Formats from `BOUNDARY_TIMESTAMP_FORMATS` are tried in
/// order.
pub fn parse_boundary_timestamp(raw: &str) -> Option<NaiveDateTime> {
    constants::BOUNDARY_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn parse(content: &str) -> (Vec<LogRecord>, LoadSummary) {
        let mut records = Vec::new();
        let summary = parse_reader(
            content.as_bytes(),
            &PathBuf::from("test.log"),
            0,
            &mut records,
        )
        .unwrap();
        (records, summary)
    }

    #[test]
    fn test_header_regex_compiles() {
        assert!(header_regex().is_match("01 Jan 2020, 00:00:00.100: INFO : [111] : start job"));
    }

    #[test]
    fn test_parse_basic_lines() {
        let content = "01 Jan 2020, 00:00:00.100: INFO : [111] : start job\n\
                       01 Jan 2020, 00:00:01.500: ERROR : [222] : job failed: code=7\n";
        let (records, summary) = parse(content);

        assert_eq!(records.len(), 2);
        assert_eq!(summary.records_added, 2);
        assert_eq!(records[0].props.seq, 0);
        assert_eq!(records[0].props.severity, "INFO");
        assert_eq!(records[0].props.pid, 111);
        assert_eq!(records[0].original, "start job");
        assert_eq!(records[1].props.seq, 1);
        assert_eq!(records[1].props.pid, 222);
        assert_eq!(records[1].original, "job failed: code=7");
        assert_eq!(
            records[1].props.timestamp,
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_milli_opt(0, 0, 1, 500)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_multiline_continuation() {
        let content = "01 Jan 2020, 00:00:00.100: ERROR : [1] : Exception raised\n\
                       \x20   at module.func(file:10)\n\
                       \n\
                       \x20   at module.main(file:3)\n";
        let (records, summary) = parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].original,
            "Exception raised\nat module.func(file:10)\nat module.main(file:3)"
        );
        assert_eq!(summary.continuation_lines, 2);
        assert_eq!(summary.blank_lines, 1);
    }

    #[test]
    fn test_lines_before_first_header_are_dropped() {
        let content = "preamble\nmore preamble\n\
                       01 Jan 2020, 00:00:00.100: INFO : [1] : first\n";
        let (records, summary) = parse(content);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original, "first");
        assert_eq!(summary.orphan_lines, 2);
    }

    #[test]
    fn test_parse_empty_content() {
        let (records, summary) = parse("");
        assert!(records.is_empty());
        assert_eq!(summary, LoadSummary::default());
    }

    #[test]
    fn test_severity_allows_padding_spaces() {
        let (records, _) = parse("01 Jan 2020, 00:00:00.100: WARN    : [1] : padded\n");
        assert_eq!(records[0].props.severity, "WARN");
    }

    #[test]
    fn test_invalid_date_is_treated_as_text() {
        let content = "01 Jan 2020, 00:00:00.100: INFO : [1] : first\n\
                       31 Feb 2020, 00:00:00.100: INFO : [1] : not a date\n";
        let (records, summary) = parse(content);
        assert_eq!(records.len(), 1);
        assert_eq!(summary.malformed_headers, 1);
        assert!(records[0].original.ends_with("[1] : not a date"));
    }

    #[test]
    fn test_crlf_and_invalid_utf8_are_tolerated() {
        let mut bytes = b"01 Jan 2020, 00:00:00.100: INFO : [1] : caf".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\r\n01 Jan 2020, 00:00:00.200: INFO : [1] : next\r\n");

        let mut records = Vec::new();
        parse_reader(bytes.as_slice(), &PathBuf::from("bad.log"), 0, &mut records).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].original.starts_with("caf"));
        assert_eq!(records[1].original, "next");
    }

    #[test]
    fn test_sequence_continues_from_start_value() {
        let mut records = Vec::new();
        parse_reader(
            "01 Jan 2020, 00:00:00.100: INFO : [1] : a\n".as_bytes(),
            &PathBuf::from("a.log"),
            5,
            &mut records,
        )
        .unwrap();
        assert_eq!(records[0].props.seq, 5);
    }

    #[test]
    fn test_new_load_does_not_extend_previous_record() {
        let mut records = Vec::new();
        let path = PathBuf::from("a.log");
        parse_reader(
            "01 Jan 2020, 00:00:00.100: INFO : [1] : a\n".as_bytes(),
            &path,
            0,
            &mut records,
        )
        .unwrap();
        let summary = parse_reader("stray continuation\n".as_bytes(), &path, 1, &mut records)
            .unwrap();

        assert_eq!(records[0].original, "a");
        assert_eq!(summary.orphan_lines, 1);
    }

    #[test]
    fn test_boundary_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        assert_eq!(parse_boundary_timestamp("2020-01-01 00:00:01"), Some(expected));
        assert_eq!(parse_boundary_timestamp("2020-01-01T00:00:01.000"), Some(expected));
        assert_eq!(parse_boundary_timestamp("01 Jan 2020, 00:00:01.000"), Some(expected));
        assert_eq!(parse_boundary_timestamp("2020-01-01 00:00:00.5"), Some(
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_milli_opt(0, 0, 0, 500)
                .unwrap()
        ));
        assert_eq!(parse_boundary_timestamp("01/01/2020"), None);
    }
}
