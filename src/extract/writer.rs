//! Persisting message bodies into per-message artifact directories.

use std::path::PathBuf;

use uuid::Uuid;

use crate::error::ExtractError;

/// Generate a fresh artifact identity.
///
/// A v4 UUID: 122 bits from the OS random source, the remaining six fixed by
/// the version and variant fields. That is short of a full 128 random bits;
/// v4 is kept for its standard textual form, and `persist` refuses to reuse
/// an existing directory, so a collision costs one message, never an
/// overwrite.
pub fn new_identity() -> Uuid {
    Uuid::new_v4()
}

/// Destination for resolved message bodies.
pub trait ArtifactStore {
    /// Create the artifact for `identity` and return the path of its body file.
    fn persist(&self, identity: &Uuid, full_body: &str) -> anyhow::Result<PathBuf>;
}

/// Writes `<root>/<identity>/<body_file_name>`.
pub struct RecordWriter {
    root: PathBuf,
    body_file_name: String,
}

impl RecordWriter {
    pub fn new(root: impl Into<PathBuf>, body_file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            body_file_name: body_file_name.into(),
        }
    }
}

impl ArtifactStore for RecordWriter {
    fn persist(&self, identity: &Uuid, full_body: &str) -> anyhow::Result<PathBuf> {
        let dir = self.root.join(identity.to_string());

        // `create_dir` (not `create_dir_all`) so an existing directory is a
        // hard error instead of a silent merge.
        if let Err(e) = std::fs::create_dir(&dir) {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                return Err(ExtractError::ArtifactCollision(dir).into());
            }
            return Err(ExtractError::io(&dir, e).into());
        }

        let path = dir.join(&self.body_file_name);
        if let Err(e) = std::fs::write(&path, full_body.as_bytes()) {
            // Leave nothing behind for a message that will not be indexed
            let _ = std::fs::remove_dir_all(&dir);
            return Err(ExtractError::io(&path, e).into());
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_writes_body() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = RecordWriter::new(tmp.path(), "body.html");
        let id = new_identity();
        let path = writer.persist(&id, "<p>olá</p>").unwrap();
        assert_eq!(path, tmp.path().join(id.to_string()).join("body.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>olá</p>");
    }

    #[test]
    fn test_existing_directory_is_a_collision() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = RecordWriter::new(tmp.path(), "body.html");
        let id = new_identity();
        std::fs::create_dir(tmp.path().join(id.to_string())).unwrap();
        let err = writer.persist(&id, "x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::ArtifactCollision(_))
        ));
    }

    #[test]
    fn test_identity_is_random_v4() {
        let id = new_identity();
        assert_eq!(id.get_version(), Some(uuid::Version::Random));
        assert_eq!(id.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_identities_are_distinct() {
        let ids: std::collections::HashSet<Uuid> = (0..1000).map(|_| new_identity()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
