//! Streaming MBOX scanner.
//!
//! Reads MBOX files line-by-line with a large buffer and records where each
//! message starts and ends. Message bytes are read back on demand by seeking,
//! so a folder never holds more than one message in memory.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ExtractError, Result};

/// Size of the internal read buffer (1 MB for fast sequential reads on modern SSDs).
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Byte range of one message inside an MBOX file, `From ` line included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSpan {
    pub offset: u64,
    pub length: u64,
}

/// Streaming MBOX scanner.
///
/// Tolerant of:
///
/// - Mixed `\n` and `\r\n` line endings
/// - `From ` lines not preceded by a blank line (logs a warning)
/// - Content before the first separator (treated as a message)
/// - Truncated messages at EOF
/// - UTF-8 BOM at the start of the file
pub struct MboxParser {
    path: PathBuf,
    file_size: u64,
}

impl MboxParser {
    /// Create a scanner for the given MBOX file.
    ///
    /// Verifies that the file exists and is readable, but does NOT validate
    /// that it is actually an MBOX.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::InputNotFound(path.clone())
            } else {
                ExtractError::io(&path, e)
            }
        })?;
        Ok(Self {
            path,
            file_size: metadata.len(),
        })
    }

    /// Scan the whole file and return the span of every message, in file order.
    pub fn scan_spans(&self) -> Result<Vec<MessageSpan>> {
        let mut spans = Vec::new();
        if self.file_size == 0 {
            return Ok(spans);
        }

        let file = File::open(&self.path).map_err(|e| ExtractError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut current_offset: u64 = 0;
        let mut message_start: u64 = 0;
        let mut has_content = false;
        let mut prev_line_was_empty = true;
        let mut first_line = true;

        // Reusable line buffer
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);

        loop {
            line_buf.clear();
            let line_len = {
                let buf = reader
                    .fill_buf()
                    .map_err(|e| ExtractError::io(&self.path, e))?;
                if buf.is_empty() {
                    break; // EOF
                }
                let consume_len = match memchr_newline(buf) {
                    Some(pos) => pos + 1,
                    None => buf.len(),
                };
                line_buf.extend_from_slice(&buf[..consume_len]);
                reader.consume(consume_len);
                consume_len as u64
            };

            if is_mbox_separator(&line_buf) {
                if !first_line && !prev_line_was_empty {
                    warn!(
                        path = %self.path.display(),
                        offset = current_offset,
                        "Found 'From ' separator without preceding blank line"
                    );
                }
                if has_content {
                    spans.push(MessageSpan {
                        offset: message_start,
                        length: current_offset - message_start,
                    });
                }
                message_start = current_offset;
                has_content = true;
            } else if !has_content && !is_blank_line(&line_buf) {
                message_start = current_offset;
                has_content = true;
            }

            prev_line_was_empty = is_blank_line(&line_buf);
            first_line = false;
            current_offset += line_len;
        }

        if has_content {
            spans.push(MessageSpan {
                offset: message_start,
                length: current_offset - message_start,
            });
        }

        Ok(spans)
    }

    /// Read a single message at the given span.
    ///
    /// Uses `seek` to jump directly to the message without scanning the file.
    pub fn read_message_at(path: impl AsRef<Path>, span: MessageSpan) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
        file.seek(SeekFrom::Start(span.offset))
            .map_err(|e| ExtractError::io(path, e))?;
        let mut buffer = vec![0u8; span.length as usize];
        file.read_exact(&mut buffer)
            .map_err(|e| ExtractError::io(path, e))?;
        Ok(buffer)
    }
}

/// Strip the leading `From ` separator line from raw MBOX message bytes.
pub fn skip_from_line(raw: &[u8]) -> &[u8] {
    if is_mbox_separator(raw) {
        if let Some(pos) = memchr_newline(raw) {
            return &raw[pos + 1..];
        }
        return &[];
    }
    raw
}

/// Fast newline search (equivalent to memchr for `\n`).
#[inline]
fn memchr_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    let line = line.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(line);
    line.starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}
