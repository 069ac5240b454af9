//! Local-filesystem artifact store.
//!
//! Import artifacts are addressed by relative path (e.g.
//! `imports/3f2a….csv`) under a configured storage root. The store
//! rejects paths that would escape the root.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Environment variable naming the storage root directory.
pub const STORAGE_ROOT_ENV: &str = "STORAGE_ROOT";

/// Default storage root when `STORAGE_ROOT` is unset.
pub const DEFAULT_STORAGE_ROOT: &str = "storage";

/// Subdirectory under the root where uploaded CSV artifacts are staged.
pub const IMPORTS_DIR: &str = "imports";

/// A file store rooted at a single directory, addressed by relative path.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build a store from the `STORAGE_ROOT` environment variable,
    /// falling back to [`DEFAULT_STORAGE_ROOT`].
    pub fn from_env() -> Self {
        let root = std::env::var(STORAGE_ROOT_ENV)
            .unwrap_or_else(|_| DEFAULT_STORAGE_ROOT.to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root.
    ///
    /// Absolute paths and paths containing `..` components are rejected
    /// so callers cannot address files outside the store.
    pub fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let path = Path::new(relative);
        let escapes = path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes storage root: {relative}"),
            ));
        }
        Ok(self.root.join(path))
    }

    /// Open an artifact for reading.
    pub fn open(&self, relative: &str) -> io::Result<File> {
        File::open(self.resolve(relative)?)
    }

    /// Persist an uploaded artifact, creating parent directories as
    /// needed. Used by the upload endpoint, not by the import job.
    pub async fn save(&self, relative: &str, contents: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await
    }

    /// Delete an artifact.
    pub fn delete(&self, relative: &str) -> io::Result<()> {
        std::fs::remove_file(self.resolve(relative)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_under_root() {
        let store = ArtifactStore::new("/data/storage");
        let path = store.resolve("imports/file.csv").unwrap();
        assert_eq!(path, PathBuf::from("/data/storage/imports/file.csv"));
    }

    #[test]
    fn resolve_rejects_absolute_path() {
        let store = ArtifactStore::new("/data/storage");
        assert!(store.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn resolve_rejects_parent_traversal() {
        let store = ArtifactStore::new("/data/storage");
        assert!(store.resolve("imports/../../secrets.csv").is_err());
    }

    #[tokio::test]
    async fn save_open_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.save("imports/test.csv", b"a,b\n1,2\n").await.unwrap();
        assert!(store.open("imports/test.csv").is_ok());

        store.delete("imports/test.csv").unwrap();
        assert!(store.open("imports/test.csv").is_err());
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let store = ArtifactStore::new("/nonexistent-root");
        let err = store.open("imports/missing.csv").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
