// logsift - core/export.rs
//
// CSV and JSON output of query results: whole records, or the captured
// groups produced by the select family.
// Core layer: writes to any Write trait object.

use crate::core::model::{Groups, LogRecord};
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;

/// Write records as CSV: `seq,timestamp,severity,pid,original`.
///
/// Multi-line text is quoted by the CSV writer, so each record stays one
/// logical row.
pub fn export_records_csv<'a, W, I>(records: I, writer: W) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a LogRecord>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["seq", "timestamp", "severity", "pid", "original"])
        .map_err(|e| ExportError::Csv { source: e })?;

    let mut count = 0;
    for record in records {
        let seq = record.props.seq.to_string();
        let timestamp = record
            .props
            .timestamp
            .format(constants::RENDER_TIMESTAMP_FORMAT)
            .to_string();
        let pid = record.props.pid.to_string();
        csv_writer
            .write_record([
                seq.as_str(),
                timestamp.as_str(),
                record.props.severity.as_str(),
                pid.as_str(),
                record.original.as_str(),
            ])
            .map_err(|e| ExportError::Csv { source: e })?;
        count += 1;
    }

    csv_writer
        .flush()
        .map_err(|e| ExportError::Io { source: e })?;
    Ok(count)
}

/// Write records as a pretty-printed JSON array of objects.
pub fn export_records_json<W: Write>(
    records: &[LogRecord],
    writer: W,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json { source: e })?;
    Ok(records.len())
}

/// Write extracted groups as header-less CSV, one row per match. Absent
/// groups become empty fields.
pub fn export_groups_csv<W: Write>(rows: &[Groups], writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);
    for row in rows {
        csv_writer
            .write_record(row.iter().map(|g| g.as_deref().unwrap_or("")))
            .map_err(|e| ExportError::Csv { source: e })?;
    }
    csv_writer
        .flush()
        .map_err(|e| ExportError::Io { source: e })?;
    Ok(rows.len())
}

/// Write extracted groups as a JSON array of arrays; absent groups are
/// `null`.
pub fn export_groups_json<W: Write>(rows: &[Groups], writer: W) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, rows).map_err(|e| ExportError::Json { source: e })?;
    Ok(rows.len())
}
