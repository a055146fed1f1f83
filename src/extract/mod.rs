//! The extraction pipeline: walk the archive, persist bodies, write the index.

pub mod body;
pub mod fields;
pub mod walker;
pub mod writer;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::info;

use crate::archive::{self, FolderNode};
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::index;

use self::walker::TreeWalker;
use self::writer::RecordWriter;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct ExtractionSummary {
    /// Messages written to the index.
    pub extracted: usize,
    /// Messages dropped after a message-level failure.
    pub skipped: usize,
    /// Sub-folders that could not be opened.
    pub skipped_folders: usize,
    /// Total size of all persisted bodies.
    pub body_bytes: u64,
    pub output_root: PathBuf,
    pub index_path: PathBuf,
    pub elapsed: Duration,
}

/// Default index location: `<output_root>/<input stem>.csv`.
pub fn default_index_path(input: &Path, output_root: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "index".to_string());
    output_root.join(format!("{stem}.csv"))
}

/// Extract every message of the archive at `input` into `output_root`.
///
/// Fails before writing anything if the input is missing, the output root
/// (or an explicit index path) already exists, or the archive cannot be
/// opened.
pub fn extract_archive(
    input: &Path,
    output_root: &Path,
    index_path: Option<&Path>,
    config: &ExtractConfig,
    progress: Option<&dyn Fn(usize)>,
) -> anyhow::Result<ExtractionSummary> {
    if !input.exists() {
        return Err(ExtractError::InputNotFound(input.to_path_buf()).into());
    }
    if output_root.exists() {
        return Err(ExtractError::OutputExists(output_root.to_path_buf()).into());
    }

    let index_path = index_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_index_path(input, output_root));
    check_index_location(&index_path, output_root)?;

    let root = archive::tree::open(input)?;
    info!(input = %input.display(), "Opened archive");

    extract_tree(root.as_ref(), output_root, &index_path, config, progress)
}

/// Run the pipeline over an already opened folder tree.
pub fn extract_tree(
    root: &dyn FolderNode,
    output_root: &Path,
    index_path: &Path,
    config: &ExtractConfig,
    progress: Option<&dyn Fn(usize)>,
) -> anyhow::Result<ExtractionSummary> {
    if output_root.exists() {
        return Err(ExtractError::OutputExists(output_root.to_path_buf()).into());
    }
    check_index_location(index_path, output_root)?;

    let start = Instant::now();
    create_output_root(output_root)?;
    info!(output = %output_root.display(), "Extracting messages");

    let writer = RecordWriter::new(output_root, config.body_file_name.clone());
    let outcome = TreeWalker::new(config, &writer)
        .with_progress(progress)
        .walk(root);

    let extracted = outcome.records.len();
    let records = index::builder::build(outcome.records);
    index::writer::write_index(&records, index_path, config)?;

    let summary = ExtractionSummary {
        extracted,
        skipped: outcome.skipped_messages,
        skipped_folders: outcome.skipped_folders,
        body_bytes: outcome.body_bytes,
        output_root: output_root.to_path_buf(),
        index_path: index_path.to_path_buf(),
        elapsed: start.elapsed(),
    };
    info!(
        extracted = summary.extracted,
        skipped = summary.skipped,
        index = %summary.index_path.display(),
        "Extraction finished"
    );
    Ok(summary)
}

/// The index must not exist yet, and must land either directly in the output
/// root or in a directory that already exists.
fn check_index_location(index_path: &Path, output_root: &Path) -> crate::error::Result<()> {
    if index_path.exists() {
        return Err(ExtractError::IndexExists(index_path.to_path_buf()));
    }
    let parent = index_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if parent != output_root && !parent.is_dir() {
        return Err(ExtractError::IndexDirMissing(index_path.to_path_buf()));
    }
    Ok(())
}

/// Create the output root's ancestors, then the root itself with
/// `create_dir` so a directory that appeared since the existence check is
/// refused instead of merged into.
fn create_output_root(output_root: &Path) -> crate::error::Result<()> {
    if let Some(parent) = output_root.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
    }
    std::fs::create_dir(output_root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            ExtractError::OutputExists(output_root.to_path_buf())
        } else {
            ExtractError::io(output_root, e)
        }
    })
}
