//! Server configuration
//!
//! Parsed once at startup from flags and environment (an optional `.env` is
//! loaded first by the binary), then handed to the router. Handlers never
//! read the environment themselves.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use storymem_core::embeddings::{
    DEFAULT_BASE_URL, DEFAULT_DIMENSIONS, DEFAULT_MODEL, DEFAULT_QUERY_CACHE_SIZE,
};
use storymem_core::{
    CachedEmbeddings, DisabledEmbeddings, EmbeddingProvider, OpenAiConfig, OpenAiEmbeddings,
    DEFAULT_READING_LEVEL,
};

/// Storymem - story memory API for personalised reading
#[derive(Debug, Clone, Parser)]
#[command(name = "storymem-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP API for child reading profiles, stories, semantic search and feedback")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "STORYMEM_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// Shared bearer token required on every endpoint except /health
    #[arg(long, env = "API_KEY", hide_env_values = true, value_parser = parse_api_key)]
    pub api_key: String,

    /// Embedding provider credential; embeddings are disabled when absent
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible embeddings API
    #[arg(long, env = "EMBEDDING_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub embedding_base_url: String,

    /// Embedding model name
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_MODEL)]
    pub embedding_model: String,

    /// Expected embedding length (0 accepts any)
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = DEFAULT_DIMENSIONS)]
    pub embedding_dimensions: usize,

    /// Seconds before an embedding request is abandoned
    #[arg(long, env = "EMBEDDING_TIMEOUT_SECS", default_value_t = 10)]
    pub embedding_timeout_secs: u64,

    /// Number of query embeddings kept in memory (0 disables the cache)
    #[arg(long, env = "QUERY_CACHE_SIZE", default_value_t = DEFAULT_QUERY_CACHE_SIZE)]
    pub query_cache_size: usize,

    /// Reading level for new profiles that do not specify one
    #[arg(
        long,
        env = "DEFAULT_READING_LEVEL",
        default_value_t = DEFAULT_READING_LEVEL,
        value_parser = clap::value_parser!(i32).range(1..=10)
    )]
    pub default_reading_level: i32,

    /// Emit logs as JSON lines
    #[arg(long, env = "STORYMEM_LOG_JSON")]
    pub log_json: bool,
}

/// A blank key would let an empty bearer token through
fn parse_api_key(raw: &str) -> Result<String, String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err("API key must not be blank".to_string());
    }
    Ok(key.to_string())
}

impl ServerConfig {
    /// Build the embedding provider this configuration describes
    pub fn embedding_provider(&self) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
        let Some(key) = self.openai_api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Ok(Arc::new(DisabledEmbeddings));
        };

        let openai = OpenAiEmbeddings::new(OpenAiConfig {
            api_key: key.trim().to_string(),
            base_url: self.embedding_base_url.clone(),
            model: self.embedding_model.clone(),
            dimensions: (self.embedding_dimensions > 0).then_some(self.embedding_dimensions),
            timeout: Duration::from_secs(self.embedding_timeout_secs.max(1)),
        })?;

        Ok(Arc::new(CachedEmbeddings::new(openai, self.query_cache_size)))
    }

    /// Whether a real provider is configured
    pub fn embeddings_enabled(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}
