//! Depth-first traversal of an archive tree.

use tracing::{debug, warn};

use super::body::BodyResolver;
use super::fields::FieldExtractor;
use super::writer::{new_identity, ArtifactStore};
use crate::archive::FolderNode;
use crate::config::ExtractConfig;
use crate::model::record::ExtractedRecord;

/// Records produced by a walk, in visitation order.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub records: Vec<ExtractedRecord>,
    /// Messages dropped after a message-level failure.
    pub skipped_messages: usize,
    /// Sub-folders that could not be opened.
    pub skipped_folders: usize,
    /// Total bytes of body content written.
    pub body_bytes: u64,
}

/// Visits every message of a folder tree, pre-order: a folder's own messages
/// first, then each sub-folder in turn.
///
/// A message that cannot be read or persisted is logged and skipped; the
/// walk itself never fails.
pub struct TreeWalker<'a> {
    extractor: FieldExtractor<'a>,
    resolver: BodyResolver<'a>,
    store: &'a dyn ArtifactStore,
    progress: Option<&'a dyn Fn(usize)>,
    outcome: WalkOutcome,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a ExtractConfig, store: &'a dyn ArtifactStore) -> Self {
        Self {
            extractor: FieldExtractor::new(config),
            resolver: BodyResolver::new(config),
            store,
            progress: None,
            outcome: WalkOutcome::default(),
        }
    }

    /// Report the number of visited messages after each one.
    pub fn with_progress(mut self, progress: Option<&'a dyn Fn(usize)>) -> Self {
        self.progress = progress;
        self
    }

    pub fn walk(mut self, root: &dyn FolderNode) -> WalkOutcome {
        let path = root.name().to_string();
        self.visit(root, &path);
        self.outcome
    }

    fn visit(&mut self, folder: &dyn FolderNode, path: &str) {
        let message_count = folder.message_count();
        debug!(
            folder = path,
            messages = message_count,
            sub_folders = folder.sub_folder_count(),
            "Visiting folder"
        );

        for index in 0..message_count {
            match self.process_message(folder, index) {
                Ok(record) => self.outcome.records.push(record),
                Err(e) => {
                    warn!(folder = path, index, error = %e, "Error reading message {index}; skipping");
                    self.outcome.skipped_messages += 1;
                }
            }
            if let Some(cb) = self.progress {
                cb(self.outcome.records.len() + self.outcome.skipped_messages);
            }
        }

        for index in 0..folder.sub_folder_count() {
            match folder.sub_folder(index) {
                Ok(sub) => {
                    let sub_path = format!("{path}/{}", sub.name());
                    self.visit(sub.as_ref(), &sub_path);
                }
                Err(e) => {
                    warn!(folder = path, index, error = %e, "Cannot open sub-folder; skipping");
                    self.outcome.skipped_folders += 1;
                }
            }
        }
    }

    /// Extract, resolve and persist one message. The record exists only once
    /// its artifact has been written.
    fn process_message(
        &mut self,
        folder: &dyn FolderNode,
        index: usize,
    ) -> anyhow::Result<ExtractedRecord> {
        let message = folder.message(index)?;
        let fields = self.extractor.extract(message.as_ref());
        let resolved = self.resolver.resolve(&fields.html_body, &fields.plain_body);

        let identity = new_identity();
        let body_path = self.store.persist(&identity, &resolved.full_body)?;
        self.outcome.body_bytes += resolved.full_body.len() as u64;

        Ok(ExtractedRecord {
            identity,
            received_at: fields.received_at,
            subject: fields.subject,
            sender: fields.sender,
            snippet: resolved.snippet,
            body_path,
            sequence: (self.outcome.records.len() + self.outcome.skipped_messages) as u64,
        })
    }
}
