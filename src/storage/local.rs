//! Local filesystem persistence.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::MetadataStore;
use crate::storage::StorePaths;

/// Filesystem-backed persistence for metadata, documents and logs.
#[derive(Clone)]
pub struct FileStore {
    paths: StorePaths,
}

impl FileStore {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Create the directory roots. Idempotent.
    pub async fn ensure_layout(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.paths.store_dir()).await?;
        tokio::fs::create_dir_all(self.paths.archive_dir()).await?;
        tokio::fs::create_dir_all(self.paths.output_dir()).await?;
        tokio::fs::create_dir_all(self.paths.log_dir()).await?;
        Ok(())
    }

    /// Load the metadata store, or `None` if the file does not exist.
    pub async fn load_metadata(&self) -> Result<Option<MetadataStore>> {
        match tokio::fs::read(self.paths.metadata_file()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Persist the metadata store as pretty-printed JSON, atomically.
    pub async fn save_metadata(&self, store: &MetadataStore) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(store)?;
        self.write_atomic(self.paths.metadata_file(), &bytes).await
    }

    /// Write a fetched document body, creating parent directories.
    pub async fn write_document(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_parent(path).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Remove a file, ignoring an already-missing one.
    pub async fn discard(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the daily log, replacing any same-day content.
    pub async fn write_daily_log(&self, date: &str, text: &str) -> Result<()> {
        let path = self.paths.log_file(date);
        self.ensure_parent(&path).await?;
        tokio::fs::write(&path, text.as_bytes()).await?;
        Ok(())
    }

    /// Ensure a path's parent directory exists.
    async fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_parent(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PathsConfig, ResourceState};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(StorePaths::resolve(dir.path(), &PathsConfig::default()))
    }

    #[tokio::test]
    async fn test_metadata_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        assert!(store.load_metadata().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metadata_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let mut meta = MetadataStore::default();
        meta.insert(
            "a.html",
            ResourceState {
                modified: "Mon, 02 Jan 2023 00:00:00 GMT".into(),
                hash: "abc".into(),
            },
        );
        store.save_metadata(&meta).await.unwrap();

        let loaded = store.load_metadata().await.unwrap().unwrap();
        assert_eq!(loaded.entries(), meta.entries());
        assert!(!loaded.is_dirty());

        // No leftover temp file from the atomic write
        assert!(!tmp.path().join("status.tmp").exists());
    }

    #[tokio::test]
    async fn test_metadata_is_pretty_printed() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let mut meta = MetadataStore::default();
        meta.insert(
            "a.html",
            ResourceState {
                modified: "m".into(),
                hash: "h".into(),
            },
        );
        store.save_metadata(&meta).await.unwrap();

        let text = tokio::fs::read_to_string(store.paths().metadata_file())
            .await
            .unwrap();
        assert!(text.contains("\n"));
        assert!(text.contains("\"a.html\""));
    }

    #[tokio::test]
    async fn test_write_document_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let path = store.paths().live_file("a.html");
        store.write_document(&path, b"body").await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"body");
    }

    #[tokio::test]
    async fn test_discard_tolerates_missing() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let path = store.paths().temp_file("a.html");
        store.discard(&path).await.unwrap();

        store.write_document(&path, b"tmp").await.unwrap();
        store.discard(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_daily_log_overwrites_same_day() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store
            .write_daily_log("2023-01-02", "Added: a.html\n")
            .await
            .unwrap();
        store
            .write_daily_log("2023-01-02", "No changes detected.\n")
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(store.paths().log_file("2023-01-02"))
            .await
            .unwrap();
        assert_eq!(text, "No changes detected.\n");
    }

    #[tokio::test]
    async fn test_ensure_layout_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.ensure_layout().await.unwrap();
        store.ensure_layout().await.unwrap();

        assert!(store.paths().store_dir().is_dir());
        assert!(store.paths().archive_dir().is_dir());
        assert!(store.paths().output_dir().is_dir());
        assert!(store.paths().log_dir().is_dir());
    }
}
