//! Keyword retrieval and disambiguation
//!
//! Search is exact-token overlap: the query and each document's name and
//! description are tokenized the same way, and a document's score is the
//! number of distinct query tokens present in its token set. A strict top
//! score wins outright; only an exact tie at the maximum produces the
//! numbered disambiguation list.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use sdk::errors::BotError;
use sdk::BlobStore;

use crate::db::{Document, DocumentRepository};

/// Outcome of a search
#[derive(Debug, PartialEq)]
pub enum RankedResult {
    /// No document shares a token with the query
    NoMatch,
    /// A single document scored strictly higher than every other
    SingleMatch(Document),
    /// Two or more documents tied at the maximum score, in fetch order
    Ambiguous(Vec<Document>),
}

/// Lower-case and split on runs of non-alphanumeric characters
///
/// Applied identically to queries, file names, and descriptions; a query
/// and a document can only meet on tokens produced by this one function.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The combined token set of a document's name and description
fn token_set(doc: &Document) -> HashSet<String> {
    let mut set: HashSet<String> = tokenize(&doc.original_name).into_iter().collect();
    set.extend(tokenize(&doc.description));
    set
}

/// Count distinct query tokens present in the document's token set
///
/// Frequency and token length carry no weight.
fn score(query_tokens: &HashSet<String>, doc: &Document) -> usize {
    let tokens = token_set(doc);
    query_tokens.iter().filter(|t| tokens.contains(*t)).count()
}

/// Rank documents against a tokenized query
///
/// Pure over its inputs; `search` feeds it the full document list so the
/// tie order is the metadata store's fetch order.
pub fn rank(query: &str, documents: Vec<Document>) -> RankedResult {
    let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();
    if query_tokens.is_empty() {
        return RankedResult::NoMatch;
    }

    let scored: Vec<(usize, Document)> = documents
        .into_iter()
        .map(|doc| (score(&query_tokens, &doc), doc))
        .filter(|(s, _)| *s > 0)
        .collect();

    let Some(max) = scored.iter().map(|(s, _)| *s).max() else {
        return RankedResult::NoMatch;
    };

    let mut top: Vec<Document> = scored
        .into_iter()
        .filter(|(s, _)| *s == max)
        .map(|(_, doc)| doc)
        .collect();

    if top.len() == 1 {
        RankedResult::SingleMatch(top.remove(0))
    } else {
        RankedResult::Ambiguous(top)
    }
}

/// Scores documents from the metadata repository and resolves blobs
pub struct RetrievalEngine {
    documents: DocumentRepository,
    blobs: Arc<dyn BlobStore>,
}

impl RetrievalEngine {
    pub fn new(documents: DocumentRepository, blobs: Arc<dyn BlobStore>) -> Self {
        Self { documents, blobs }
    }

    /// Search the whole corpus for a fuzzy keyword query
    pub async fn search(&self, query: &str) -> Result<RankedResult, BotError> {
        let documents = self
            .documents
            .list_all()
            .await
            .map_err(|e| BotError::Database(e.to_string()))?;

        debug!(query, corpus = documents.len(), "Scoring documents");
        Ok(rank(query, documents))
    }

    /// Resolve a document's bytes through the blob store
    ///
    /// `NotFound` here means the blob was deleted out-of-band; the metadata
    /// row still exists.
    pub async fn fetch_by_record(&self, document: &Document) -> Result<Vec<u8>, BotError> {
        self.blobs.get(&document.storage_key).await
    }
}
