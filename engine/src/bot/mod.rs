//! Bot event loop
//!
//! Drives a `ChatTransport`: fetch inbound events, hand each to the router
//! on its own task, deliver the resulting replies. One task per event means
//! a stalled sender (blocked on storage) never holds up other senders;
//! events for the same sender still serialize on that sender's session cell.

pub mod telegram;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use sdk::ChatTransport;

use crate::router::ConversationRouter;

pub use telegram::TelegramTransport;

/// Couples a transport to the conversation router
pub struct BotRunner {
    transport: Arc<dyn ChatTransport>,
    router: Arc<ConversationRouter>,
}

impl BotRunner {
    pub fn new(transport: Arc<dyn ChatTransport>, router: Arc<ConversationRouter>) -> Self {
        Self { transport, router }
    }

    /// Run the event loop
    ///
    /// This blocks the current task. Transport fetch errors are logged and
    /// retried after a short pause; they never abort the loop.
    pub async fn run(&self) -> Result<()> {
        info!("Starting bot event loop");

        loop {
            match self.transport.next_events().await {
                Ok(events) => {
                    for event in events {
                        let router = Arc::clone(&self.router);
                        let transport = Arc::clone(&self.transport);
                        tokio::spawn(async move {
                            let sender = event.sender_id.clone();
                            for reply in router.handle_event(event).await {
                                if let Err(e) = transport.send(&sender, reply).await {
                                    error!(sender = %sender, error = %e, "Reply delivery failed");
                                }
                            }
                        });
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to fetch inbound events");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }
}
