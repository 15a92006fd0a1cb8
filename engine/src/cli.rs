//! CLI interface for LectureBot
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LectureBot document engine
///
/// Ingests documents over a chat transport, deduplicates them by content,
/// and serves them back through fuzzy keyword search.
#[derive(Parser, Debug)]
#[command(name = "lecturebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot in the foreground
    Start,

    /// List stored documents
    List {
        /// Number of documents to show (default: 20)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Run a retrieval query from the terminal
    Search {
        /// The keyword query
        query: String,
    },
}
