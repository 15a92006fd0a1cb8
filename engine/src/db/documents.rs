/// Document persistence operations
///
/// This module provides the metadata repository for stored documents.
/// All queries use parameterized queries for SQL injection prevention.
///
/// A document row is immutable once inserted; the description is supplied
/// at insert time, after the pending-upload flow has collected it.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// Document record
///
/// `content_hash` is the hex SHA-256 digest of the raw bytes and is unique
/// across the table. `storage_key` locates the blob in the blob store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i64,
    pub content_hash: String,
    pub storage_key: String,
    pub original_name: String,
    pub description: String,
    pub sender_id: String,
    pub created_at: i64,
}

/// Result of an insert attempt
///
/// The UNIQUE constraint on `content_hash` is the authoritative duplicate
/// guard, so a lost race between two uploads of the same content surfaces
/// here rather than as a second row.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(Document),
    DuplicateHash,
}

/// Fields for a new document row
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub content_hash: String,
    pub storage_key: String,
    pub original_name: String,
    pub description: String,
    pub sender_id: String,
    pub created_at: i64,
}

/// Document repository for database operations
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Create a new document repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new document record
    ///
    /// Returns `DuplicateHash` when the content hash already exists instead
    /// of treating the constraint violation as a hard error.
    pub async fn insert(&self, new: NewDocument) -> Result<InsertOutcome> {
        let result = sqlx::query(
            "INSERT INTO documents (content_hash, storage_key, original_name, description, sender_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.content_hash)
        .bind(&new.storage_key)
        .bind(&new.original_name)
        .bind(&new.description)
        .bind(&new.sender_id)
        .bind(new.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(InsertOutcome::Inserted(Document {
                id: done.last_insert_rowid(),
                content_hash: new.content_hash,
                storage_key: new.storage_key,
                original_name: new.original_name,
                description: new.description,
                sender_id: new.sender_id,
                created_at: new.created_at,
            })),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateHash)
            }
            Err(e) => Err(e).context("Failed to insert document"),
        }
    }

    /// Find a document by its content hash
    pub async fn find_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, content_hash, storage_key, original_name, description, sender_id, created_at \
             FROM documents WHERE content_hash = ?",
        )
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch document by hash")?;

        Ok(row.map(row_to_document))
    }

    /// List all documents in insertion order
    ///
    /// Retrieval scoring iterates this; the order is the stable candidate
    /// order used when a search ties.
    pub async fn list_all(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, content_hash, storage_key, original_name, description, sender_id, created_at \
             FROM documents ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list documents")?;

        Ok(rows.into_iter().map(row_to_document).collect())
    }

    /// Count stored documents
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count documents")?;

        Ok(count)
    }
}

fn row_to_document(r: sqlx::sqlite::SqliteRow) -> Document {
    Document {
        id: r.get("id"),
        content_hash: r.get("content_hash"),
        storage_key: r.get("storage_key"),
        original_name: r.get("original_name"),
        description: r.get("description"),
        sender_id: r.get("sender_id"),
        created_at: r.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tempfile::TempDir;

    fn sample(hash: &str, key: &str) -> NewDocument {
        NewDocument {
            content_hash: hash.to_string(),
            storage_key: key.to_string(),
            original_name: "week1.pdf".to_string(),
            description: "MAT101".to_string(),
            sender_id: "111@c.us".to_string(),
            created_at: 1_700_000_000,
        }
    }

    async fn scratch_repo(dir: &TempDir) -> DocumentRepository {
        let db = Database::new(&dir.path().join("test.db")).await.unwrap();
        db.documents()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_hash() {
        let dir = TempDir::new().unwrap();
        let repo = scratch_repo(&dir).await;

        let outcome = repo.insert(sample("hash_a", "key_a")).await.unwrap();
        let doc = match outcome {
            InsertOutcome::Inserted(d) => d,
            InsertOutcome::DuplicateHash => panic!("unexpected duplicate"),
        };
        assert!(doc.id > 0);

        let found = repo.find_by_hash("hash_a").await.unwrap().unwrap();
        assert_eq!(found, doc);

        assert!(repo.find_by_hash("hash_b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_hash_reported_not_inserted() {
        let dir = TempDir::new().unwrap();
        let repo = scratch_repo(&dir).await;

        repo.insert(sample("hash_a", "key_a")).await.unwrap();
        let second = repo.insert(sample("hash_a", "key_b")).await.unwrap();

        assert!(matches!(second, InsertOutcome::DuplicateHash));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_all_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let repo = scratch_repo(&dir).await;

        repo.insert(sample("hash_a", "key_a")).await.unwrap();
        repo.insert(sample("hash_b", "key_b")).await.unwrap();
        repo.insert(sample("hash_c", "key_c")).await.unwrap();

        let all = repo.list_all().await.unwrap();
        let hashes: Vec<&str> = all.iter().map(|d| d.content_hash.as_str()).collect();
        assert_eq!(hashes, vec!["hash_a", "hash_b", "hash_c"]);
    }
}
