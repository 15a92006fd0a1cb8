//! Filesystem blob store
//!
//! Stores each blob as one file under the configured blob directory, named
//! by its storage key. Keys are generated by the ingestion pipeline and are
//! already filesystem-safe; this backend still refuses to overwrite an
//! existing key.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use sdk::errors::BotError;
use sdk::BlobStore;

/// Blob store backed by a local directory
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory blobs are written under
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    /// Write `bytes` to `<root>/<key>`
    ///
    /// The content type is recorded by the metadata repository, not here;
    /// a filesystem has nowhere useful to put it.
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<String, BotError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BotError::StorageFailed(format!("create blob dir: {}", e)))?;

        let path = self.root.join(key);
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| BotError::StorageFailed(format!("stat {}: {}", key, e)))?
        {
            return Err(BotError::StorageFailed(format!("key collision: {}", key)));
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| BotError::StorageFailed(format!("write {}: {}", key, e)))?;

        debug!(key, size = bytes.len(), "Blob written");
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BotError> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BotError::NotFound(key.to_string())),
            Err(e) => Err(BotError::StorageFailed(format!("read {}: {}", key, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"));

        let key = store
            .put("1700_notes.pdf", b"pdf bytes", "application/pdf")
            .await
            .unwrap();
        assert_eq!(key, "1700_notes.pdf");

        let bytes = store.get("1700_notes.pdf").await.unwrap();
        assert_eq!(bytes, b"pdf bytes");
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());

        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, BotError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_put_existing_key_fails() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());

        store.put("k", b"first", "application/pdf").await.unwrap();
        let err = store.put("k", b"second", "application/pdf").await.unwrap_err();
        assert!(matches!(err, BotError::StorageFailed(_)));

        // Original bytes untouched
        assert_eq!(store.get("k").await.unwrap(), b"first");
    }
}
