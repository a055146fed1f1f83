//! Reading a CSV index back, plus summary statistics over its rows.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::writer::INDEX_HEADER;
use crate::error::ExtractError;

/// One data row of the index, as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub email_id: String,
    pub date_received: String,
    pub subject: String,
    pub sender: String,
    pub body: String,
}

impl IndexRow {
    /// The receipt time, or `None` for the date sentinel.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date_received)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A syntax or layout problem in index text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexParseError {
    /// 1-based physical line.
    pub line: usize,
    pub reason: String,
}

/// Read and validate the index at `path`.
pub fn read_index(path: &Path) -> crate::error::Result<Vec<IndexRow>> {
    let text = std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
    parse_index(&text).map_err(|e| ExtractError::InvalidIndex {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })
}

/// Parse index text: the fixed header row followed by five-field rows.
pub fn parse_index(text: &str) -> Result<Vec<IndexRow>, IndexParseError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut records = parse_csv(text)?.into_iter();

    let header = records.next().ok_or_else(|| IndexParseError {
        line: 1,
        reason: "missing header row".to_string(),
    })?;
    if header.fields != INDEX_HEADER {
        return Err(IndexParseError {
            line: 1,
            reason: format!("unexpected header {:?}", header.fields),
        });
    }

    records
        .map(|record| {
            let line = record.line;
            let fields: [String; 5] = record.fields.try_into().map_err(|f: Vec<String>| {
                IndexParseError {
                    line,
                    reason: format!("expected 5 fields, found {}", f.len()),
                }
            })?;
            let [email_id, date_received, subject, sender, body] = fields;
            Ok(IndexRow {
                email_id,
                date_received,
                subject,
                sender,
                body,
            })
        })
        .collect()
}

/// A CSV record and the line it starts on.
struct CsvRecord {
    line: usize,
    fields: Vec<String>,
}

/// Split RFC 4180 text into records. Quoted fields may span lines.
fn parse_csv(text: &str) -> Result<Vec<CsvRecord>, IndexParseError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !was_quoted => {
                in_quotes = true;
                was_quoted = true;
            }
            '"' => {
                return Err(IndexParseError {
                    line,
                    reason: "stray quote in field".to_string(),
                })
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                was_quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                was_quoted = false;
                records.push(CsvRecord {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
            }
            _ => {
                if was_quoted {
                    return Err(IndexParseError {
                        line,
                        reason: "text after closing quote".to_string(),
                    });
                }
                field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(IndexParseError {
            line: record_line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if was_quoted || !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(CsvRecord {
            line: record_line,
            fields,
        });
    }

    Ok(records)
}

/// Return the date range (oldest, newest) across rows with a readable date.
pub fn date_range(rows: &[IndexRow]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut dates = rows.iter().filter_map(IndexRow::received_at);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
}

/// Count rows whose date is the sentinel (or otherwise unreadable).
pub fn count_undated(rows: &[IndexRow]) -> usize {
    rows.iter().filter(|r| r.received_at().is_none()).count()
}

/// Return the top N senders by message count.
pub fn top_senders(rows: &[IndexRow], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.sender.as_str()).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(sender, count)| (sender.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(n);
    sorted
}
