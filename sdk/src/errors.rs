//! Error types and handling
//!
//! This module provides the error types used throughout the LectureBot engine.
//! All errors implement the `BotErrorExt` trait which provides the reply text
//! shown to the conversation partner and indicates whether errors are
//! recoverable by that sender.
//!
//! # Reply Safety
//!
//! The `user_hint()` strings are sent verbatim back over the messaging
//! transport, so they must never contain storage keys, file system paths,
//! or database details.

use thiserror::Error;

/// Trait for LectureBot error extensions
///
/// Provides additional context for errors: a hint that is safe to send as a
/// chat reply, and recoverability information. All engine errors implement
/// this trait.
pub trait BotErrorExt {
    /// Returns the sender-facing reply text for the error
    ///
    /// The hint is safe to deliver over the transport and does not contain:
    /// - Storage keys or file system paths
    /// - Database or transport implementation details
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be corrected by the sender (retrying a number,
    /// re-uploading a file). Non-recoverable errors require operator
    /// intervention.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// This enum represents all possible errors that can occur in the LectureBot
/// engine. Each variant carries enough context for logging while keeping the
/// sender-facing hint free of internal detail.
///
/// # Error Categories
///
/// - **Ingestion**: duplicate uploads, missing pending buffers
/// - **Storage**: blob store and metadata repository failures
/// - **Retrieval**: missing blobs, invalid disambiguation replies
/// - **Configuration**: invalid or missing configuration
/// - **Transport**: messaging transport failures
#[derive(Debug, Error)]
pub enum BotError {
    // Ingestion errors
    #[error("Duplicate document: content hash {0} already stored")]
    Duplicate(String),

    #[error("No pending upload for sender {0}")]
    NoPendingUpload(String),

    // Storage errors
    #[error("Storage operation failed: {0}")]
    StorageFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    // Retrieval errors
    #[error("Invalid selection: {got} is not in 1..={max}")]
    InvalidSelection { got: String, max: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotErrorExt for BotError {
    fn user_hint(&self) -> &str {
        match self {
            // Ingestion errors
            Self::Duplicate(_) => "This file has already been uploaded.",
            Self::NoPendingUpload(_) => {
                "There is no upload waiting for a description. Send the file first."
            }

            // Storage errors
            Self::StorageFailed(_) => "Failed to save the file. Please try again.",
            Self::NotFound(_) => "Error retrieving the file. Please try again.",
            Self::Database(_) => "Error looking up files. Please try again.",

            // Retrieval errors
            Self::InvalidSelection { .. } => {
                "Invalid number. Please reply with a valid number from the list."
            }

            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",

            // Transport errors
            Self::Transport(_) => "Message delivery failed. Please try again.",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Operator problems, not sender problems
            Self::Config(_) => false,

            // Everything else the sender can retry from a clean state
            _ => true,
        }
    }
}
