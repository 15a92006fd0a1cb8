//! Integration tests for the Telegram transport
//!
//! Validates the long-poll fetch, offset advancement, document download,
//! and reply delivery against a mocked API server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lecturebot_engine::bot::TelegramTransport;
use sdk::types::Reply;
use sdk::ChatTransport;

const TOKEN: &str = "123:abc";

fn transport(server: &MockServer) -> TelegramTransport {
    TelegramTransport::new(TOKEN.to_string(), 0).with_api_base(server.uri())
}

#[tokio::test]
async fn test_text_message_becomes_event_and_offset_advances() {
    let server = MockServer::start().await;

    let updates = json!({
        "ok": true,
        "result": [{
            "update_id": 10,
            "message": {
                "chat": { "id": 4242 },
                "text": "send mat101"
            }
        }]
    });

    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updates))
        .mount(&server)
        .await;

    // After consuming update 10 the next poll must ask from offset 11
    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .and(query_param("offset", "11"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": [] })),
        )
        .mount(&server)
        .await;

    let transport = transport(&server);

    let events = transport.next_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sender_id, "4242");
    assert_eq!(events[0].text, "send mat101");
    assert!(events[0].document.is_none());

    let events = transport.next_events().await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_document_message_is_downloaded() {
    let server = MockServer::start().await;

    let updates = json!({
        "ok": true,
        "result": [{
            "update_id": 1,
            "message": {
                "chat": { "id": 7 },
                "document": {
                    "file_id": "FILE42",
                    "file_name": "notes.pdf",
                    "mime_type": "application/pdf"
                }
            }
        }]
    });

    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(updates))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getFile", TOKEN)))
        .and(query_param("file_id", "FILE42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "file_path": "documents/notes.pdf" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/file/bot{}/documents/notes.pdf", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf bytes".to_vec()))
        .mount(&server)
        .await;

    let transport = transport(&server);
    let events = transport.next_events().await.unwrap();

    assert_eq!(events.len(), 1);
    let payload = events[0].document.as_ref().unwrap();
    assert_eq!(payload.bytes, b"pdf bytes");
    assert_eq!(payload.declared_name, "notes.pdf");
    assert_eq!(payload.declared_mime, "application/pdf");
}

#[tokio::test]
async fn test_api_error_surfaces_as_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": false })))
        .mount(&server)
        .await;

    let transport = transport(&server);
    assert!(transport.next_events().await.is_err());
}

#[tokio::test]
async fn test_send_text_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server);
    transport
        .send("4242", Reply::text("File received."))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_document_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendDocument", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server);
    transport
        .send(
            "4242",
            Reply::Document {
                bytes: b"pdf bytes".to_vec(),
                file_name: "notes.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_to_non_numeric_sender_fails() {
    let server = MockServer::start().await;
    let transport = transport(&server);

    assert!(transport.send("not-a-chat-id", Reply::text("hi")).await.is_err());
}
