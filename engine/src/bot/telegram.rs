//! Telegram transport
//!
//! Provides a long-polling `ChatTransport` backend. Inbound messages are
//! turned into conversation events (downloading attached documents through
//! the file API) and reply directives are delivered with sendMessage /
//! sendDocument.

use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use async_trait::async_trait;
use sdk::errors::BotError;
use sdk::types::{DocumentPayload, InboundEvent, Reply};
use sdk::ChatTransport;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Deserialize, Debug)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Deserialize, Debug)]
struct Message {
    chat: Chat,
    text: Option<String>,
    caption: Option<String>,
    document: Option<TgDocument>,
}

#[derive(Deserialize, Debug)]
struct Chat {
    id: i64,
}

#[derive(Deserialize, Debug)]
struct TgDocument {
    file_id: String,
    file_name: Option<String>,
    mime_type: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GetUpdatesResponse {
    ok: bool,
    result: Option<Vec<Update>>,
}

#[derive(Deserialize, Debug)]
struct GetFileResponse {
    ok: bool,
    result: Option<FileInfo>,
}

#[derive(Deserialize, Debug)]
struct FileInfo {
    file_path: Option<String>,
}

/// Long-polling Telegram backend
pub struct TelegramTransport {
    token: String,
    api_base: String,
    client: Client,
    poll_timeout_secs: u64,
    offset: Mutex<i64>,
}

impl TelegramTransport {
    pub fn new(token: String, poll_timeout_secs: u64) -> Self {
        Self {
            token,
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(poll_timeout_secs + 30))
                .build()
                .unwrap_or_default(),
            poll_timeout_secs,
            offset: Mutex::new(0),
        }
    }

    /// Point the transport at a different API host (used by tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Download a document's bytes through getFile + the file endpoint
    async fn download_document(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
        let url = format!("{}?file_id={}", self.method_url("getFile"), file_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("getFile: {}", e)))?
            .json::<GetFileResponse>()
            .await
            .map_err(|e| BotError::Transport(format!("getFile decode: {}", e)))?;

        let file_path = response
            .result
            .filter(|_| response.ok)
            .and_then(|info| info.file_path)
            .ok_or_else(|| BotError::Transport("getFile returned no path".to_string()))?;

        let file_url = format!("{}/file/bot{}/{}", self.api_base, self.token, file_path);
        let bytes = self
            .client
            .get(&file_url)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("file download: {}", e)))?
            .bytes()
            .await
            .map_err(|e| BotError::Transport(format!("file body: {}", e)))?;

        Ok(bytes.to_vec())
    }

    /// Convert one update into an inbound event, downloading any document
    async fn event_from_message(&self, msg: Message) -> Option<InboundEvent> {
        let sender_id = msg.chat.id.to_string();
        let text = msg.text.or(msg.caption).unwrap_or_default();

        let document = match msg.document {
            Some(doc) => match self.download_document(&doc.file_id).await {
                Ok(bytes) => Some(DocumentPayload::new(
                    bytes,
                    doc.file_name.unwrap_or_default(),
                    doc.mime_type.unwrap_or_default(),
                )),
                Err(e) => {
                    warn!(sender = %sender_id, error = %e, "Document download failed");
                    None
                }
            },
            None => None,
        };

        if text.is_empty() && document.is_none() {
            return None;
        }

        Some(InboundEvent {
            sender_id,
            text,
            document,
        })
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn next_events(&self) -> Result<Vec<InboundEvent>, BotError> {
        let offset = *self.offset.lock().await;
        let url = format!(
            "{}?offset={}&timeout={}",
            self.method_url("getUpdates"),
            offset,
            self.poll_timeout_secs
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("getUpdates: {}", e)))?
            .json::<GetUpdatesResponse>()
            .await
            .map_err(|e| BotError::Transport(format!("getUpdates decode: {}", e)))?;

        if !response.ok {
            return Err(BotError::Transport("getUpdates returned ok=false".to_string()));
        }

        let updates = response.result.unwrap_or_default();
        let mut events = Vec::new();

        for update in updates {
            {
                let mut offset = self.offset.lock().await;
                *offset = (*offset).max(update.update_id + 1);
            }
            if let Some(msg) = update.message {
                if let Some(event) = self.event_from_message(msg).await {
                    events.push(event);
                }
            }
        }

        debug!(count = events.len(), "Fetched inbound events");
        Ok(events)
    }

    async fn send(&self, sender_id: &str, reply: Reply) -> Result<(), BotError> {
        let chat_id: i64 = sender_id
            .parse()
            .map_err(|_| BotError::Transport(format!("bad chat id: {}", sender_id)))?;

        match reply {
            Reply::Text(text) => {
                #[derive(Serialize)]
                struct SendMsgReq<'a> {
                    chat_id: i64,
                    text: &'a str,
                }

                self.client
                    .post(self.method_url("sendMessage"))
                    .json(&SendMsgReq {
                        chat_id,
                        text: &text,
                    })
                    .send()
                    .await
                    .map_err(|e| BotError::Transport(format!("sendMessage: {}", e)))?;
            }
            Reply::Document {
                bytes,
                file_name,
                mime_type,
            } => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| BotError::Transport(format!("bad mime type: {}", e)))?;
                let form = multipart::Form::new()
                    .text("chat_id", chat_id.to_string())
                    .part("document", part);

                self.client
                    .post(self.method_url("sendDocument"))
                    .multipart(form)
                    .send()
                    .await
                    .map_err(|e| BotError::Transport(format!("sendDocument: {}", e)))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_embeds_token() {
        let transport = TelegramTransport::new("123:abc".to_string(), 30);
        assert_eq!(
            transport.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_with_api_base_override() {
        let transport =
            TelegramTransport::new("t".to_string(), 30).with_api_base("http://localhost:9999");
        assert_eq!(
            transport.method_url("sendMessage"),
            "http://localhost:9999/bott/sendMessage"
        );
    }
}
