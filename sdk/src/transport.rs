//! Messaging transport trait
//!
//! The engine is transport-agnostic: anything that can deliver inbound
//! events and accept reply directives can drive it. The engine ships a
//! Telegram long-polling backend; the original deployment target was a
//! WhatsApp bridge with the same event shape.

use async_trait::async_trait;

use crate::errors::BotError;
use crate::types::{InboundEvent, Reply};

/// A messaging transport the bot runner can drive
///
/// `next_events` blocks until at least one event is available (long-poll
/// semantics). Delivery is at-least-once; the engine does not deduplicate
/// inbound events beyond what the transport's own offset tracking provides.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for and return the next batch of inbound events
    async fn next_events(&self) -> Result<Vec<InboundEvent>, BotError>;

    /// Deliver one reply directive to a sender
    async fn send(&self, sender_id: &str, reply: Reply) -> Result<(), BotError>;
}
