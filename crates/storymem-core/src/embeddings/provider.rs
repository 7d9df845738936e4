//! Embedding providers
//!
//! [`EmbeddingProvider`] is the seam between the story service and whatever
//! computes vectors. Callers use [`EmbeddingProvider::try_embed`], which folds
//! every failure into [`EmbeddingOutcome::Unavailable`].

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lru::LruCache;

use super::vector::Embedding;

/// Default number of cached query embeddings
pub const DEFAULT_QUERY_CACHE_SIZE: usize = 100;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Embedding error types
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    /// No provider credential configured
    #[error("Embedding provider not configured")]
    NotConfigured,
    /// Transport failure, including timeouts
    #[error("Network error: {0}")]
    Network(String),
    /// Provider answered with a non-success status
    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Response body did not contain a usable vector
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// Invalid input (empty text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of asking for an embedding: a vector, or the reason there is none
#[derive(Debug, Clone)]
pub enum EmbeddingOutcome {
    Available(Embedding),
    Unavailable { reason: String },
}

impl EmbeddingOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, EmbeddingOutcome::Available(_))
    }

    /// The embedding, if one was produced
    pub fn into_embedding(self) -> Option<Embedding> {
        match self {
            EmbeddingOutcome::Available(embedding) => Some(embedding),
            EmbeddingOutcome::Unavailable { .. } => None,
        }
    }
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Anything that can turn text into a vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;

    /// Embed, logging and absorbing any failure
    async fn try_embed(&self, text: &str) -> EmbeddingOutcome {
        match self.embed(text).await {
            Ok(embedding) => EmbeddingOutcome::Available(embedding),
            Err(EmbeddingError::NotConfigured) => {
                tracing::debug!("Embedding skipped: provider not configured");
                EmbeddingOutcome::Unavailable {
                    reason: EmbeddingError::NotConfigured.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(model = self.model_name(), "Error generating embedding: {}", e);
                EmbeddingOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        (**self).embed(text).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

// ============================================================================
// DISABLED PROVIDER
// ============================================================================

/// Provider used when no credential is configured; never produces vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEmbeddings;

#[async_trait]
impl EmbeddingProvider for DisabledEmbeddings {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Err(EmbeddingError::NotConfigured)
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}

// ============================================================================
// CACHED PROVIDER
// ============================================================================

/// LRU cache in front of another provider
///
/// Only successful embeddings are cached, so a provider outage is retried on
/// the next request.
pub struct CachedEmbeddings<P> {
    inner: P,
    cache: Option<Mutex<LruCache<String, Embedding>>>,
}

impl<P: EmbeddingProvider> CachedEmbeddings<P> {
    /// Wrap `inner`; a capacity of 0 disables caching
    pub fn new(inner: P, capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { inner, cache }
    }

    fn lookup(&self, text: &str) -> Option<Embedding> {
        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().ok()?;
        guard.get(text).cloned()
    }

    fn remember(&self, text: &str, embedding: &Embedding) {
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.lock() {
                guard.put(text.to_string(), embedding.clone());
            }
        }
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbeddings<P> {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if let Some(hit) = self.lookup(text) {
            return Ok(hit);
        }
        let embedding = self.inner.embed(text).await?;
        self.remember(text, &embedding);
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

// ============================================================================
// TESTS
// ============================================================================
