//! Decoder for mail archives laid out on disk.
//!
//! - A directory is a folder. `*.eml` files inside it are its messages;
//!   sub-directories and `*.mbox` files are its sub-folders.
//! - An `*.mbox` file is a folder of the messages it contains.
//! - A lone `*.eml` file is a folder holding that single message.
//!
//! Entries are enumerated in byte-wise file-name order. Hidden entries and
//! unrelated files are ignored.
//! Symbolic links inside the tree are skipped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{FieldError, FieldResult, FolderNode, MessageHandle};
use crate::error::{ExtractError, Result};
use crate::model::fields::RawBody;
use crate::parser::header::{parse_date, received_timestamp};
use crate::parser::mbox::{MboxParser, MessageSpan};
use crate::parser::mime::{self, DecodedMessage};

/// Open the root folder of the archive at `path`.
pub fn open(path: &Path) -> Result<Box<dyn FolderNode>> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractError::InputNotFound(path.to_path_buf())
        } else {
            ExtractError::io(path, e)
        }
    })?;

    if metadata.is_dir() {
        return Ok(Box::new(DirFolder::open(path)?));
    }
    if !metadata.is_file() {
        return Err(ExtractError::archive(path, "not a file or directory"));
    }
    if has_extension(path, "eml") {
        return Ok(Box::new(SingleMessageFolder {
            name: display_name(path),
            path: path.to_path_buf(),
        }));
    }
    Ok(Box::new(MboxFolder::open(path)?))
}

/// Case-insensitive extension check.
fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn out_of_range(path: &Path, what: &str, index: usize) -> ExtractError {
    ExtractError::archive(path, format!("{what} index {index} out of range"))
}

// ── Directory folders ───────────────────────────────────────────

/// A directory of `.eml` messages, sub-directories and `.mbox` files.
///
/// Symbolic links are never followed, so a link back to an ancestor cannot
/// turn the tree into a cycle.
struct DirFolder {
    path: PathBuf,
    name: String,
    messages: Vec<PathBuf>,
    sub_folders: Vec<SubFolder>,
}

/// A sub-folder entry, classified when the parent directory is listed.
enum SubFolder {
    Dir(PathBuf),
    Mbox(PathBuf),
}

impl DirFolder {
    fn open(path: &Path) -> Result<Self> {
        let mut entries: Vec<(PathBuf, std::fs::FileType)> = std::fs::read_dir(path)
            .map_err(|e| ExtractError::io(path, e))?
            .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
            .collect::<std::io::Result<_>>()
            .map_err(|e| ExtractError::io(path, e))?;
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut messages = Vec::new();
        let mut sub_folders = Vec::new();
        for (entry, file_type) in entries {
            let hidden = entry
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            if hidden {
                continue;
            }
            if file_type.is_symlink() {
                debug!(path = %entry.display(), "Skipping symbolic link");
            } else if file_type.is_dir() {
                sub_folders.push(SubFolder::Dir(entry));
            } else if file_type.is_file() && has_extension(&entry, "mbox") {
                sub_folders.push(SubFolder::Mbox(entry));
            } else if file_type.is_file() && has_extension(&entry, "eml") {
                messages.push(entry);
            } else {
                debug!(path = %entry.display(), "Ignoring non-mail file");
            }
        }

        debug!(
            path = %path.display(),
            messages = messages.len(),
            sub_folders = sub_folders.len(),
            "Opened directory folder"
        );

        Ok(Self {
            path: path.to_path_buf(),
            name: display_name(path),
            messages,
            sub_folders,
        })
    }
}

impl FolderNode for DirFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn sub_folder_count(&self) -> usize {
        self.sub_folders.len()
    }

    fn message(&self, index: usize) -> Result<Box<dyn MessageHandle>> {
        let path = self
            .messages
            .get(index)
            .ok_or_else(|| out_of_range(&self.path, "message", index))?;
        let raw = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
        Ok(Box::new(MailMessage::from_bytes(&raw)))
    }

    fn sub_folder(&self, index: usize) -> Result<Box<dyn FolderNode>> {
        match self
            .sub_folders
            .get(index)
            .ok_or_else(|| out_of_range(&self.path, "folder", index))?
        {
            SubFolder::Dir(path) => Ok(Box::new(DirFolder::open(path)?)),
            SubFolder::Mbox(path) => Ok(Box::new(MboxFolder::open(path)?)),
        }
    }
}

// ── MBOX folders ────────────────────────────────────────────────

/// An MBOX file; a leaf folder.
struct MboxFolder {
    path: PathBuf,
    name: String,
    spans: Vec<MessageSpan>,
}

impl MboxFolder {
    fn open(path: &Path) -> Result<Self> {
        let parser = MboxParser::new(path)?;
        let spans = parser.scan_spans()?;
        debug!(
            path = %path.display(),
            messages = spans.len(),
            "Scanned MBOX folder"
        );
        Ok(Self {
            path: path.to_path_buf(),
            name: display_name(path),
            spans,
        })
    }
}

impl FolderNode for MboxFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn message_count(&self) -> usize {
        self.spans.len()
    }

    fn sub_folder_count(&self) -> usize {
        0
    }

    fn message(&self, index: usize) -> Result<Box<dyn MessageHandle>> {
        let span = *self
            .spans
            .get(index)
            .ok_or_else(|| out_of_range(&self.path, "message", index))?;
        let raw = MboxParser::read_message_at(&self.path, span)?;
        Ok(Box::new(MailMessage::from_bytes(&raw)))
    }

    fn sub_folder(&self, index: usize) -> Result<Box<dyn FolderNode>> {
        Err(out_of_range(&self.path, "folder", index))
    }
}

// ── Single message ──────────────────────────────────────────────

/// Root folder for a lone `.eml` input.
struct SingleMessageFolder {
    path: PathBuf,
    name: String,
}

impl FolderNode for SingleMessageFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn message_count(&self) -> usize {
        1
    }

    fn sub_folder_count(&self) -> usize {
        0
    }

    fn message(&self, index: usize) -> Result<Box<dyn MessageHandle>> {
        if index != 0 {
            return Err(out_of_range(&self.path, "message", index));
        }
        let raw = std::fs::read(&self.path).map_err(|e| ExtractError::io(&self.path, e))?;
        Ok(Box::new(MailMessage::from_bytes(&raw)))
    }

    fn sub_folder(&self, index: usize) -> Result<Box<dyn FolderNode>> {
        Err(out_of_range(&self.path, "folder", index))
    }
}

// ── Messages ────────────────────────────────────────────────────

/// An RFC 5322 message. Undecodable bytes fail every accessor.
pub struct MailMessage {
    decoded: Option<DecodedMessage>,
}

impl MailMessage {
    /// Decode raw message bytes (an MBOX `From ` line is tolerated).
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            decoded: mime::decode_message(raw),
        }
    }

    fn decoded(&self) -> std::result::Result<&DecodedMessage, FieldError> {
        self.decoded.as_ref().ok_or(FieldError::Undecodable)
    }
}

/// Parse an optional raw date, failing when it is present but unreadable.
fn parse_header_date(
    field: &'static str,
    raw: Option<&str>,
) -> FieldResult<DateTime<Utc>> {
    match raw {
        None => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or_else(|| FieldError::Malformed {
            field,
            reason: format!("unparseable date '{raw}'"),
        }),
    }
}

impl MessageHandle for MailMessage {
    fn subject(&self) -> FieldResult<String> {
        Ok(self.decoded()?.subject.clone())
    }

    fn sender_name(&self) -> FieldResult<String> {
        Ok(self.decoded()?.sender.clone())
    }

    fn delivery_time(&self) -> FieldResult<DateTime<Utc>> {
        let received = self.decoded()?.received.as_deref();
        match received {
            None => Ok(None),
            Some(value) => match received_timestamp(value) {
                Some(stamp) => parse_header_date("delivery time", Some(stamp)),
                None => Err(FieldError::Malformed {
                    field: "delivery time",
                    reason: "Received header has no timestamp".to_string(),
                }),
            },
        }
    }

    fn creation_time(&self) -> FieldResult<DateTime<Utc>> {
        parse_header_date("creation time", self.decoded()?.date.as_deref())
    }

    fn html_body(&self) -> FieldResult<RawBody> {
        Ok(self.decoded()?.html.clone())
    }

    fn plain_text_body(&self) -> FieldResult<RawBody> {
        Ok(self.decoded()?.text.clone())
    }
}
