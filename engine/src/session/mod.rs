//! Per-sender conversation state
//!
//! Every sender has at most one active session state, held only in memory.
//! The state decides how the router interprets the sender's next message:
//! as a description completing a pending upload, as a numeric reply picking
//! from search candidates, or as a fresh command.
//!
//! # Concurrency
//!
//! The transport does not guarantee strictly serialized delivery per sender,
//! so check-then-transition on a sender's state must be atomic. The store
//! keeps one async mutex per sender and hands out the cell; a handler locks
//! it for the whole event. Distinct senders never contend.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::Document;

/// What the next message from a sender will be interpreted as
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// No pending interaction
    #[default]
    Idle,
    /// A document was received and buffered; the next non-blank text is its
    /// description. The buffered payload itself lives in the ingestion
    /// pipeline, keyed by the same sender.
    AwaitingDescription,
    /// A search tied; the next message, if a valid 1-based index, picks one
    /// of these candidates. Order matches the enumerated list reply.
    AwaitingSelection { candidates: Vec<Document> },
}

/// Keyed store of per-sender session cells
///
/// `entry()` returns the sender's cell, creating an `Idle` one on first
/// use. Callers lock the cell across their whole read-modify-write so two
/// events for the same sender serialize.
#[derive(Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the session cell for a sender
    pub async fn entry(&self, sender_id: &str) -> Arc<Mutex<SessionState>> {
        let mut entries = self.entries.lock().await;
        Arc::clone(
            entries
                .entry(sender_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(SessionState::Idle))),
        )
    }

    /// Snapshot a sender's current state (test and diagnostics helper)
    pub async fn peek(&self, sender_id: &str) -> SessionState {
        let cell = self.entry(sender_id).await;
        let state = cell.lock().await;
        state.clone()
    }

    /// Drop a sender's cell entirely
    ///
    /// Completed flows normally just write `Idle` back; this exists so long
    /// running deployments can evict senders that went quiet.
    pub async fn remove(&self, sender_id: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(sender_id);
    }

    /// Number of tracked senders
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64) -> Document {
        Document {
            id,
            content_hash: format!("hash{}", id),
            storage_key: format!("key{}", id),
            original_name: "a.pdf".to_string(),
            description: "MAT101".to_string(),
            sender_id: "s".to_string(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_entry_starts_idle() {
        let store = SessionStore::new();
        assert_eq!(store.peek("alice").await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_state_is_per_sender() {
        let store = SessionStore::new();

        {
            let cell = store.entry("alice").await;
            *cell.lock().await = SessionState::AwaitingDescription;
        }

        assert_eq!(store.peek("alice").await, SessionState::AwaitingDescription);
        assert_eq!(store.peek("bob").await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_same_sender_gets_same_cell() {
        let store = SessionStore::new();
        let a = store.entry("alice").await;
        let b = store.entry("alice").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_remove_resets_sender() {
        let store = SessionStore::new();
        {
            let cell = store.entry("alice").await;
            *cell.lock().await = SessionState::AwaitingSelection {
                candidates: vec![doc(1), doc(2)],
            };
        }
        store.remove("alice").await;
        assert_eq!(store.peek("alice").await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_events_for_same_sender_serialize() {
        let store = Arc::new(SessionStore::new());

        // Two tasks each do a check-then-set; the lock makes each pair atomic
        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let cell = store.entry("alice").await;
                let mut state = cell.lock().await;
                if *state == SessionState::Idle {
                    tokio::task::yield_now().await;
                    *state = SessionState::AwaitingDescription;
                    true
                } else {
                    false
                }
            }));
        }

        let mut transitions = 0;
        for h in handles {
            if h.await.unwrap() {
                transitions += 1;
            }
        }
        // Exactly one task observed Idle and transitioned
        assert_eq!(transitions, 1);
    }
}
