//! Centralized error types for mailextract.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the mailextract library.
///
/// Everything here is either structural (the run cannot start) or an I/O
/// failure with path context. Per-field accessor failures live in
/// [`crate::archive::FieldError`] and never surface as an `ExtractError`.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input archive does not exist.
    #[error("The file '{0}' does not exist.")]
    InputNotFound(PathBuf),

    /// The output root already exists; runs never merge into an old tree.
    #[error("The output directory '{0}' already exists. Please choose a new directory.")]
    OutputExists(PathBuf),

    /// The index file already exists.
    #[error("The index file '{0}' already exists.")]
    IndexExists(PathBuf),

    /// The index would be written into a directory that does not exist.
    #[error("The directory for the index file '{0}' does not exist.")]
    IndexDirMissing(PathBuf),

    /// The archive decoder could not open the input.
    #[error("Cannot open archive '{path}': {reason}")]
    Archive { path: PathBuf, reason: String },

    /// An artifact directory with the generated identity was already present.
    #[error("Artifact directory already exists: {0}")]
    ArtifactCollision(PathBuf),

    /// The tabular index could not be read back.
    #[error("Malformed index '{path}' at line {line}: {reason}")]
    InvalidIndex {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Convenience alias for `Result<T, ExtractError>`.
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `Archive` variant for a decoder that refused the input.
    pub fn archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare; prefer `ExtractError::io`).
impl From<std::io::Error> for ExtractError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
