//! Conversation routing
//!
//! The router is the single entry point for inbound events. It inspects the
//! sender's session state and the message content, dispatches to the
//! ingestion pipeline or the retrieval engine, and emits reply directives.
//! It performs no storage I/O of its own and makes at most one session
//! state transition per event.
//!
//! Dispatch order (first match wins):
//! 1. awaiting a description and text is non-blank -> finalize the upload
//! 2. awaiting a selection -> parse a 1-based index
//! 3. greeting token -> welcome reply
//! 4. accepted document attached -> receive into the pipeline
//! 5. command prefix -> search
//! 6. anything else -> silently ignored

use tracing::{info, warn};

use sdk::errors::{BotError, BotErrorExt};
use sdk::types::{InboundEvent, Reply};

use crate::db::Document;
use crate::ingest::{IngestionPipeline, ReceiveOutcome};
use crate::retrieval::{RankedResult, RetrievalEngine};
use crate::session::{SessionState, SessionStore};

/// Static reply surfaces
const WELCOME: &str = "Welcome to LectureBot.\n\
     Send a PDF to store it, then describe it with a course code.\n\
     Send something like \"send MAT101\" to receive a note.";
const PROMPT_DESCRIPTION: &str =
    "File received. Now send the course code or title for this note.";
const NO_MATCH: &str = "No matching materials found for your request.";
const DEFAULT_FILE_NAME: &str = "file.pdf";

fn saved_reply(description: &str) -> String {
    format!("File saved under \"{}\".", description)
}

/// The numbered list shown when a search ties
fn selection_list(candidates: &[Document]) -> String {
    let mut text = String::from("Multiple matches found:\n\n");
    for (idx, doc) in candidates.iter().enumerate() {
        let desc = if doc.description.is_empty() {
            "no description"
        } else {
            &doc.description
        };
        text.push_str(&format!("{}. {} ({})\n", idx + 1, doc.original_name, desc));
    }
    text.push_str("\nReply with the number of the material you want to receive.");
    text
}

/// Router tunables, normally taken from the bot config section
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Token that triggers the welcome reply (case-insensitive)
    pub greeting: String,
    /// Prefix that marks a message as a search command (case-insensitive)
    pub command_prefix: String,
    /// The only media kind accepted for ingestion
    pub accepted_mime: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            greeting: "hello".to_string(),
            command_prefix: "send ".to_string(),
            accepted_mime: "application/pdf".to_string(),
        }
    }
}

/// Pure dispatcher over session state
pub struct ConversationRouter {
    sessions: SessionStore,
    ingest: IngestionPipeline,
    retrieval: RetrievalEngine,
    options: RouterOptions,
}

impl ConversationRouter {
    pub fn new(
        sessions: SessionStore,
        ingest: IngestionPipeline,
        retrieval: RetrievalEngine,
        mut options: RouterOptions,
    ) -> Self {
        // Prefix matching is case-insensitive; normalize once so rule 5 can
        // compare and slice against the lowered message directly.
        options.command_prefix = options.command_prefix.to_lowercase();
        Self {
            sessions,
            ingest,
            retrieval,
            options,
        }
    }

    /// The session store, for diagnostics and tests
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The ingestion pipeline, for diagnostics and tests
    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.ingest
    }

    /// Process one inbound event and return its replies
    ///
    /// The sender's session cell stays locked for the whole event, so two
    /// events from the same sender serialize while other senders proceed.
    pub async fn handle_event(&self, event: InboundEvent) -> Vec<Reply> {
        let sender = event.sender_id.clone();
        info!(
            sender = %sender,
            text = %event.text,
            has_document = event.document.is_some(),
            "Handling inbound event"
        );

        let cell = self.sessions.entry(&sender).await;
        let mut state = cell.lock().await;

        // 1. A pending upload consumes the next non-blank text as its
        //    description. Blank text keeps the sender waiting.
        if *state == SessionState::AwaitingDescription && !event.text.trim().is_empty() {
            // Cleared regardless of outcome so a failing finalize cannot
            // soft-lock the sender.
            *state = SessionState::Idle;
            return match self.ingest.finalize(&sender, &event.text).await {
                Ok(doc) => vec![Reply::text(saved_reply(&doc.description))],
                Err(e) => {
                    warn!(sender = %sender, error = %e, "Finalize failed");
                    vec![Reply::text(e.user_hint())]
                }
            };
        }

        // 2. A pending selection consumes the next message as a 1-based
        //    index. Invalid input keeps the candidates for a retry.
        if let SessionState::AwaitingSelection { candidates } = &*state {
            let max = candidates.len();
            let choice = match event.text.trim().parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => n,
                _ => {
                    let err = BotError::InvalidSelection {
                        got: event.text.trim().to_string(),
                        max,
                    };
                    return vec![Reply::text(err.user_hint())];
                }
            };

            let chosen = candidates[choice - 1].clone();
            *state = SessionState::Idle;
            return vec![self.deliver(&chosen).await];
        }

        // 3. Greeting
        if event.text.trim().eq_ignore_ascii_case(&self.options.greeting) {
            return vec![Reply::text(WELCOME)];
        }

        // 4. Document upload
        if let Some(payload) = &event.document {
            if payload.declared_mime == self.options.accepted_mime {
                return match self.ingest.receive(&sender, payload).await {
                    Ok(ReceiveOutcome::Buffered) => {
                        *state = SessionState::AwaitingDescription;
                        vec![Reply::text(PROMPT_DESCRIPTION)]
                    }
                    Ok(ReceiveOutcome::Duplicate) => {
                        *state = SessionState::Idle;
                        vec![Reply::text(
                            BotError::Duplicate(String::new()).user_hint(),
                        )]
                    }
                    Err(e) => {
                        warn!(sender = %sender, error = %e, "Receive failed");
                        *state = SessionState::Idle;
                        vec![Reply::text(e.user_hint())]
                    }
                };
            }
        }

        // 5. Search command
        let lowered = event.text.to_lowercase();
        if lowered.starts_with(&self.options.command_prefix) {
            // Slice the lowered copy: tokenization lowercases anyway, and
            // this keeps the offset on a guaranteed char boundary.
            let query = &lowered[self.options.command_prefix.len()..];
            return match self.retrieval.search(query).await {
                Ok(RankedResult::NoMatch) => vec![Reply::text(NO_MATCH)],
                Ok(RankedResult::SingleMatch(doc)) => vec![self.deliver(&doc).await],
                Ok(RankedResult::Ambiguous(candidates)) => {
                    let listing = selection_list(&candidates);
                    *state = SessionState::AwaitingSelection { candidates };
                    vec![Reply::text(listing)]
                }
                Err(e) => {
                    warn!(sender = %sender, error = %e, "Search failed");
                    vec![Reply::text(e.user_hint())]
                }
            };
        }

        // 6. Nothing matched
        Vec::new()
    }

    /// Fetch a document's bytes and wrap them as a file reply
    async fn deliver(&self, doc: &Document) -> Reply {
        match self.retrieval.fetch_by_record(doc).await {
            Ok(bytes) => Reply::Document {
                bytes,
                file_name: if doc.original_name.is_empty() {
                    DEFAULT_FILE_NAME.to_string()
                } else {
                    doc.original_name.clone()
                },
                mime_type: self.options.accepted_mime.clone(),
            },
            Err(e) => {
                warn!(id = doc.id, error = %e, "Blob fetch failed");
                Reply::text(e.user_hint())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64, name: &str, description: &str) -> Document {
        Document {
            id,
            content_hash: format!("hash{}", id),
            storage_key: format!("key{}", id),
            original_name: name.to_string(),
            description: description.to_string(),
            sender_id: "s".to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn test_selection_list_enumerates_from_one() {
        let listing = selection_list(&[doc(1, "a.pdf", "MAT101"), doc(2, "b.pdf", "")]);
        assert!(listing.contains("1. a.pdf (MAT101)"));
        assert!(listing.contains("2. b.pdf (no description)"));
        assert!(listing.contains("Reply with the number"));
    }

    #[test]
    fn test_saved_reply_quotes_description() {
        assert_eq!(saved_reply("MAT101"), "File saved under \"MAT101\".");
    }

    #[test]
    fn test_default_options() {
        let opts = RouterOptions::default();
        assert_eq!(opts.greeting, "hello");
        assert_eq!(opts.command_prefix, "send ");
        assert_eq!(opts.accepted_mime, "application/pdf");
    }
}
