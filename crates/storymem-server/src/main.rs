//! Storymem API server
//!
//! Loads `.env`, parses configuration, opens the database and serves the
//! HTTP API until interrupted.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use storymem_core::{EmbeddingProvider, Storage, StoryMemory};
use storymem_server::{build_router, serve, AppState, ServerConfig};

fn init_logging(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());

    // stderr keeps stdout free for anything piped from the process
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal in production
    let _ = dotenvy::dotenv();

    let config = ServerConfig::parse();
    init_logging(config.log_json);

    info!("Storymem server v{} starting...", env!("CARGO_PKG_VERSION"));

    let storage = Storage::new(config.database.clone()).context("Failed to open database")?;
    info!("Storage initialized successfully");

    let embeddings = config
        .embedding_provider()
        .context("Failed to configure embedding provider")?;
    if config.embeddings_enabled() {
        info!(model = embeddings.model_name(), "Semantic search enabled");
    } else {
        warn!("OPENAI_API_KEY not set; stories are saved without embeddings and search uses keywords");
    }

    let memory = StoryMemory::new(Arc::new(storage), embeddings)
        .with_default_reading_level(config.default_reading_level);
    let state = AppState::new(memory, config.api_key.as_str());

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    serve(listener, build_router(state)).await
}
