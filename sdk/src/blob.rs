//! Blob store trait
//!
//! Raw file bytes live in a blob store addressed by an opaque key. The
//! engine ships a filesystem backend; this trait is the seam that lets a
//! deployment swap in an object-storage backend without touching the
//! ingestion or retrieval code.

use async_trait::async_trait;

use crate::errors::BotError;

/// External store for raw document bytes
///
/// Keys are opaque to callers; the ingestion pipeline generates them and the
/// metadata repository records them. Implementations must treat `put` to an
/// existing key as an error rather than an overwrite.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`. Returns the key actually used.
    ///
    /// Fails with `BotError::StorageFailed` on any transport or write error,
    /// including a key collision.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, BotError>;

    /// Fetch the bytes stored under `key`.
    ///
    /// Fails with `BotError::NotFound` if the key does not exist and
    /// `BotError::StorageFailed` on transport errors.
    async fn get(&self, key: &str) -> Result<Vec<u8>, BotError>;
}
