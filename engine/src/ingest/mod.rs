//! Document ingestion pipeline
//!
//! Ingestion happens in two steps. `receive` fingerprints the bytes, runs
//! the duplicate pre-check against the metadata repository, and buffers the
//! payload in memory. `finalize` runs when the sender supplies a description:
//! only then is the blob written and the metadata row inserted, so a sender
//! who never describes an upload leaves nothing behind in storage.
//!
//! The pre-check is best-effort; two concurrent uploads of the same content
//! can both pass it. The UNIQUE constraint on `content_hash` catches the
//! loser of that race at insert time.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use sdk::errors::BotError;
use sdk::types::DocumentPayload;
use sdk::BlobStore;

use crate::db::{Document, DocumentRepository, InsertOutcome, NewDocument};

/// A received document waiting for its description
///
/// At most one of these exists per sender; a new upload from the same
/// sender replaces the old buffer outright.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub bytes: Vec<u8>,
    pub content_hash: String,
    pub original_name: String,
}

/// Result of receiving a document
#[derive(Debug, PartialEq)]
pub enum ReceiveOutcome {
    /// Buffered in memory; the next text from this sender describes it
    Buffered,
    /// Content already stored, nothing buffered
    Duplicate,
}

/// Compute the hex SHA-256 content fingerprint of a byte buffer
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Two-phase ingestion: buffer on receive, persist on finalize
pub struct IngestionPipeline {
    documents: DocumentRepository,
    blobs: Arc<dyn BlobStore>,
    content_type: String,
    pending: Mutex<HashMap<String, PendingUpload>>,
}

impl IngestionPipeline {
    pub fn new(
        documents: DocumentRepository,
        blobs: Arc<dyn BlobStore>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            documents,
            blobs,
            content_type: content_type.into(),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Receive a document from a sender
    ///
    /// Fingerprints the bytes, checks the metadata repository for the hash,
    /// and buffers the payload if it is new. No blob is written here.
    pub async fn receive(
        &self,
        sender_id: &str,
        payload: &DocumentPayload,
    ) -> Result<ReceiveOutcome, BotError> {
        let content_hash = fingerprint(&payload.bytes);
        debug!(
            sender = sender_id,
            hash = %content_hash,
            size = payload.bytes.len(),
            "Received document"
        );

        let existing = self
            .documents
            .find_by_hash(&content_hash)
            .await
            .map_err(|e| BotError::Database(e.to_string()))?;

        if existing.is_some() {
            info!(sender = sender_id, hash = %content_hash, "Duplicate upload rejected");
            // A duplicate also discards any earlier buffer: the session goes
            // Idle, so a leftover buffer would be unreachable.
            self.pending.lock().await.remove(sender_id);
            return Ok(ReceiveOutcome::Duplicate);
        }

        let mut pending = self.pending.lock().await;
        if pending.contains_key(sender_id) {
            warn!(sender = sender_id, "Replacing earlier unfinished upload buffer");
        }
        pending.insert(
            sender_id.to_string(),
            PendingUpload {
                bytes: payload.bytes.clone(),
                content_hash,
                original_name: payload.declared_name.clone(),
            },
        );

        Ok(ReceiveOutcome::Buffered)
    }

    /// Finalize a pending upload with its description
    ///
    /// Writes the blob, inserts the metadata row, and returns the created
    /// document. The buffer is discarded up front, so a storage failure is
    /// idempotent: the sender must re-upload rather than retry the text.
    pub async fn finalize(
        &self,
        sender_id: &str,
        description: &str,
    ) -> Result<Document, BotError> {
        let upload = {
            let mut pending = self.pending.lock().await;
            pending.remove(sender_id)
        }
        .ok_or_else(|| BotError::NoPendingUpload(sender_id.to_string()))?;

        let now = chrono::Utc::now();
        let storage_key = storage_key(now.timestamp_millis(), &upload.original_name);

        let stored_key = self
            .blobs
            .put(&storage_key, &upload.bytes, &self.content_type)
            .await?;

        let outcome = self
            .documents
            .insert(NewDocument {
                content_hash: upload.content_hash.clone(),
                storage_key: stored_key,
                original_name: upload.original_name,
                description: description.trim().to_string(),
                sender_id: sender_id.to_string(),
                created_at: now.timestamp(),
            })
            .await
            .map_err(|e| BotError::StorageFailed(e.to_string()))?;

        match outcome {
            InsertOutcome::Inserted(doc) => {
                info!(
                    sender = sender_id,
                    id = doc.id,
                    description = %doc.description,
                    "Document stored"
                );
                Ok(doc)
            }
            // Lost the race against a concurrent upload of the same bytes
            InsertOutcome::DuplicateHash => Err(BotError::Duplicate(upload.content_hash)),
        }
    }

    /// Whether a sender has a buffered upload
    pub async fn has_pending(&self, sender_id: &str) -> bool {
        self.pending.lock().await.contains_key(sender_id)
    }
}

/// Build a blob key from a millisecond timestamp and the declared file name
///
/// The timestamp prefix keeps keys unique; the name suffix keeps them
/// recognizable when poking at the blob directory by hand.
fn storage_key(timestamp_millis: i64, original_name: &str) -> String {
    let name = if original_name.is_empty() {
        "upload"
    } else {
        original_name
    };
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}", timestamp_millis, sanitized)
}
