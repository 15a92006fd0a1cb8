//! LectureBot SDK
//!
//! Shared library providing traits and types for LectureBot components.
//! This crate is used by the engine and by alternative transport or storage
//! backends.

/// Error types and handling
pub mod errors;

/// Conversation event and reply types
pub mod types;

/// Messaging transport trait
pub mod transport;

/// Blob store trait
pub mod blob;

// Re-export commonly used types
pub use blob::BlobStore;
pub use errors::{BotError, BotErrorExt};
pub use transport::ChatTransport;
pub use types::{DocumentPayload, InboundEvent, Reply};
