//! Contract between the extraction pipeline and an archive decoder.
//!
//! A decoder exposes the archive as a finite tree of [`FolderNode`]s. Every
//! message accessor on [`MessageHandle`] may fail on its own; callers treat
//! each failure in isolation.

pub mod tree;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::Result;
use crate::model::fields::RawBody;

/// Failure of a single message field accessor.
#[derive(Error, Debug)]
pub enum FieldError {
    /// The message could not be decoded at all.
    #[error("message could not be decoded")]
    Undecodable,

    /// The field is present but its value is malformed.
    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    /// The decoder hit an I/O error while reading the field.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a field accessor: `Ok(None)` when the field is simply absent.
pub type FieldResult<T> = std::result::Result<Option<T>, FieldError>;

/// One message yielded by a decoder. Only valid while it is being visited.
pub trait MessageHandle {
    fn subject(&self) -> FieldResult<String>;
    fn sender_name(&self) -> FieldResult<String>;
    fn delivery_time(&self) -> FieldResult<DateTime<Utc>>;
    fn creation_time(&self) -> FieldResult<DateTime<Utc>>;
    fn html_body(&self) -> FieldResult<RawBody>;
    fn plain_text_body(&self) -> FieldResult<RawBody>;
}

/// One folder of the archive tree.
///
/// Messages and sub-folders are addressed by position in the decoder's
/// native enumeration order.
pub trait FolderNode {
    /// Display name used in diagnostics.
    fn name(&self) -> &str;
    fn message_count(&self) -> usize;
    fn sub_folder_count(&self) -> usize;
    fn message(&self, index: usize) -> Result<Box<dyn MessageHandle>>;
    fn sub_folder(&self, index: usize) -> Result<Box<dyn FolderNode>>;
}
