//! Serialize records to the CSV index.
//!
//! Output is UTF-8 without BOM, one header row, fields quoted per RFC 4180.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::model::record::ExtractedRecord;

/// Column names, in output order.
pub const INDEX_HEADER: [&str; 5] = ["email_id", "date_received", "subject", "sender", "body"];

/// Write `records` (already ordered) to a new file at `output_path`.
///
/// The file must not exist yet.
pub fn write_index(
    records: &[ExtractedRecord],
    output_path: &Path,
    config: &ExtractConfig,
) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output_path)
        .map_err(|e| ExtractError::io(output_path, e))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", INDEX_HEADER.join(",")).map_err(|e| ExtractError::io(output_path, e))?;

    for record in records {
        writeln!(
            out,
            "{},{},{},{},{}",
            record.identity,
            csv_escape(&record.received_at_text(&config.date_sentinel)),
            csv_escape(&record.subject),
            csv_escape(&record.sender),
            csv_escape(&record.snippet),
        )
        .map_err(|e| ExtractError::io(output_path, e))?;
    }

    out.flush().map_err(|e| ExtractError::io(output_path, e))?;
    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
pub fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
