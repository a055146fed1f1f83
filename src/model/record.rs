//! The metadata record kept for every extracted message.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Metadata for one successfully persisted message.
///
/// Records are only created after the message body has been written, so
/// every record points at an artifact that exists on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    /// Random identity; also the name of the artifact directory.
    pub identity: Uuid,

    /// Receipt time, or `None` when the date could not be read.
    pub received_at: Option<DateTime<Utc>>,

    /// Subject text, or the subject sentinel.
    pub subject: String,

    /// Sender text, or the sender sentinel.
    pub sender: String,

    /// Single-line plain-text excerpt of the body.
    pub snippet: String,

    /// Location of the persisted full body.
    pub body_path: PathBuf,

    /// Visitation order within the walk (0, 1, 2, …).
    pub sequence: u64,
}

impl ExtractedRecord {
    /// Text written to the `date_received` column.
    pub fn received_at_text(&self, date_sentinel: &str) -> String {
        match self.received_at {
            Some(dt) => format_timestamp(&dt),
            None => date_sentinel.to_string(),
        }
    }
}

/// Format a timestamp as ISO 8601 with an explicit offset,
/// e.g. `2024-01-01T10:00:00+00:00`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
