//! Conversation event and reply types
//!
//! These are the shapes exchanged between the messaging transport and the
//! conversation router: one inbound event per delivered message, and zero or
//! more reply directives going back out.

use serde::{Deserialize, Serialize};

/// A document attached to an inbound message
///
/// `declared_mime` is whatever media kind the transport reported; the router
/// only accepts the configured kind (PDF by default) and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Raw file bytes as downloaded from the transport
    pub bytes: Vec<u8>,
    /// File name as declared by the sender's client, may be empty
    pub declared_name: String,
    /// Media kind declared by the transport (e.g. "application/pdf")
    pub declared_mime: String,
}

impl DocumentPayload {
    pub fn new(
        bytes: Vec<u8>,
        declared_name: impl Into<String>,
        declared_mime: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            declared_name: declared_name.into(),
            declared_mime: declared_mime.into(),
        }
    }
}

/// One inbound conversation event
///
/// Exactly one of these is produced per delivered message. `text` is empty
/// (not absent) when the message carried no caption, mirroring how chat
/// transports report media-only messages.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Opaque conversation identity of the sender
    pub sender_id: String,
    /// Message text, empty if the message had none
    pub text: String,
    /// Attached document, if any
    pub document: Option<DocumentPayload>,
}

impl InboundEvent {
    /// A plain text message
    pub fn text(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            document: None,
        }
    }

    /// A message carrying a document
    pub fn document(sender_id: impl Into<String>, payload: DocumentPayload) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: String::new(),
            document: Some(payload),
        }
    }
}

/// Outbound reply directive
///
/// The router emits these; the transport decides how to deliver them. Each
/// directive is one logical reply unit, delivered at-least-once.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A plain text reply
    Text(String),
    /// A file reply
    Document {
        bytes: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    /// The text content, if this is a text reply
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(t) => Some(t),
            Reply::Document { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_event_has_no_document() {
        let event = InboundEvent::text("12345@c.us", "hello");
        assert_eq!(event.sender_id, "12345@c.us");
        assert_eq!(event.text, "hello");
        assert!(event.document.is_none());
    }

    #[test]
    fn test_document_event_has_empty_text() {
        let payload = DocumentPayload::new(vec![1, 2, 3], "notes.pdf", "application/pdf");
        let event = InboundEvent::document("12345@c.us", payload);
        assert!(event.text.is_empty());
        assert_eq!(event.document.unwrap().declared_name, "notes.pdf");
    }

    #[test]
    fn test_reply_as_text() {
        assert_eq!(Reply::text("hi").as_text(), Some("hi"));
        let doc = Reply::Document {
            bytes: vec![],
            file_name: "f.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
        };
        assert!(doc.as_text().is_none());
    }
}
