//! Rendering of query results to stdout.

#![warn(clippy::all, rust_2018_idioms)]

use std::io::Write;

use anyhow::{Context, Result};

use crate::app::data_plane::cloudwatch_logs::LogRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `ID: .., Type: .., Message: ..` line per record
    #[default]
    Text,
    /// A JSON array of records
    Json,
}

/// Text rendering of a single record, without the trailing newline
pub fn format_record(record: &LogRecord) -> String {
    format!(
        "ID: {}, Type: {}, Message: {}",
        record.request_id, record.log_type, record.message
    )
}

/// Write `records` to `out` in engine order
pub fn write_records<W: Write>(
    out: &mut W,
    records: &[LogRecord],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for record in records {
                writeln!(out, "{}", format_record(record)).context("Failed to write record")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)
                .context("Failed to serialize records as JSON")?;
            writeln!(out).context("Failed to write record")?;
        }
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}
