//! Command handlers
//!
//! One function per CLI command. These wire configuration into the engine
//! components and print terminal output; conversational behavior lives in
//! the router.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use tracing::info;

use sdk::BlobStore;

use crate::bot::{BotRunner, TelegramTransport};
use crate::config::Config;
use crate::db::Database;
use crate::ingest::IngestionPipeline;
use crate::retrieval::{RankedResult, RetrievalEngine};
use crate::router::{ConversationRouter, RouterOptions};
use crate::session::SessionStore;
use crate::storage::FsBlobStore;

/// Build the router stack from configuration
async fn build_router(config: &Config) -> Result<(Database, Arc<ConversationRouter>)> {
    let db = Database::new(&config.db_path())
        .await
        .context("Failed to open metadata database")?;

    // Typed as the trait object so Arc::clone below infers correctly
    let blobs: Arc<dyn BlobStore> =
        Arc::new(FsBlobStore::new(config.storage.blob_dir.clone()));

    let ingest = IngestionPipeline::new(
        db.documents(),
        Arc::clone(&blobs),
        config.bot.accepted_mime.clone(),
    );
    let retrieval = RetrievalEngine::new(db.documents(), blobs);

    let options = RouterOptions {
        greeting: config.bot.greeting.clone(),
        command_prefix: config.bot.command_prefix.clone(),
        accepted_mime: config.bot.accepted_mime.clone(),
    };

    let router = Arc::new(ConversationRouter::new(
        SessionStore::new(),
        ingest,
        retrieval,
        options,
    ));

    Ok((db, router))
}

/// Run the bot in the foreground until interrupted
pub async fn handle_start(config: &Config) -> Result<()> {
    if config.bot.token.is_empty() {
        bail!("No bot token configured. Set bot.token in config.toml");
    }

    let (db, router) = build_router(config).await?;
    let transport = Arc::new(TelegramTransport::new(
        config.bot.token.clone(),
        config.bot.poll_timeout_secs,
    ));

    let runner = BotRunner::new(transport, router);

    let result = tokio::select! {
        r = runner.run() => r,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    db.close().await?;
    result
}

/// Print the most recent stored documents
pub async fn handle_list(limit: usize, config: &Config) -> Result<()> {
    let db = Database::new(&config.db_path()).await?;
    let documents = db.documents().list_all().await?;

    if documents.is_empty() {
        println!("No documents stored yet.");
    } else {
        println!("Stored documents ({} total):", documents.len());
        println!();
        for doc in documents.iter().rev().take(limit) {
            let when = Utc
                .timestamp_opt(doc.created_at, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| doc.created_at.to_string());
            println!(
                "  [{}] {} ({}) from {} at {}",
                doc.id, doc.original_name, doc.description, doc.sender_id, when
            );
        }
    }

    db.close().await
}

/// Run one retrieval query and print the ranking outcome
pub async fn handle_search(query: &str, config: &Config) -> Result<()> {
    let db = Database::new(&config.db_path()).await?;
    let blobs = Arc::new(FsBlobStore::new(config.storage.blob_dir.clone()));
    let retrieval = RetrievalEngine::new(db.documents(), blobs);

    match retrieval.search(query).await? {
        RankedResult::NoMatch => println!("No match."),
        RankedResult::SingleMatch(doc) => {
            println!("Match: [{}] {} ({})", doc.id, doc.original_name, doc.description);
        }
        RankedResult::Ambiguous(candidates) => {
            println!("Tied matches:");
            for (idx, doc) in candidates.iter().enumerate() {
                println!(
                    "  {}. [{}] {} ({})",
                    idx + 1,
                    doc.id,
                    doc.original_name,
                    doc.description
                );
            }
        }
    }

    db.close().await
}
