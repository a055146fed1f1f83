//! Global ordering of extracted records.

use chrono::{DateTime, Utc};

use crate::model::record::ExtractedRecord;

/// Order records newest first.
///
/// Records without a readable timestamp sort as the oldest possible time and
/// therefore land at the end. The sort is stable, so equal keys keep the
/// order in which the walk visited them.
pub fn build(mut records: Vec<ExtractedRecord>) -> Vec<ExtractedRecord> {
    sort_newest_first(&mut records);
    records
}

/// In-place variant of [`build`].
pub fn sort_newest_first(records: &mut [ExtractedRecord]) {
    records.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
}

fn sort_key(record: &ExtractedRecord) -> DateTime<Utc> {
    record.received_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}
