//! LectureBot Engine Library
//!
//! This library provides the core functionality of the LectureBot engine.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Database persistence module
pub mod db;

/// Per-sender conversation state module
pub mod session;

/// Document ingestion pipeline module
pub mod ingest;

/// Keyword retrieval and disambiguation module
pub mod retrieval;

/// Conversation routing module
pub mod router;

/// Filesystem blob store module
pub mod storage;

/// Bot event loop and transports
pub mod bot;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
