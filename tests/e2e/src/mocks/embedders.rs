//! Deterministic embedding providers
//!
//! [`KeywordAxisEmbedder`] maps each theme word to its own axis, so texts
//! about the same theme are close and different themes are orthogonal.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storymem_core::{Embedding, EmbeddingError, EmbeddingProvider};

/// Theme words, one vector axis each; the last axis catches everything else
pub const AXES: [&str; 5] = ["dragon", "space", "ocean", "forest", "robot"];

/// Embeds text by counting theme words
#[derive(Debug, Default)]
pub struct KeywordAxisEmbedder {
    calls: AtomicUsize,
}

impl KeywordAxisEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = AXES
            .iter()
            .map(|axis| lower.matches(axis).count() as f32)
            .collect();
        let other = if vector.iter().all(|v| *v == 0.0) { 1.0 } else { 0.0 };
        vector.push(other);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordAxisEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()));
        }
        Ok(Embedding::new(Self::vector_for(text)))
    }

    fn model_name(&self) -> &str {
        "keyword-axis"
    }
}

/// Provider that is always down
#[derive(Debug, Default)]
pub struct FailingEmbedder {
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbeddingError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}
