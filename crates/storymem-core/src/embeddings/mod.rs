//! Semantic Embeddings Module
//!
//! Text embeddings come from a hosted provider (OpenAI-compatible
//! `/embeddings` endpoint). The provider may be slow, rate limited or not
//! configured at all, so every call resolves to an [`EmbeddingOutcome`] and
//! callers branch on availability instead of failing.
//!
//! Supports:
//! - Vector storage encoding (little-endian f32 blobs)
//! - Cosine distance for ranking
//! - An LRU cache for repeated query strings

mod openai;
mod provider;
mod vector;

pub use openai::{OpenAiConfig, OpenAiEmbeddings, DEFAULT_BASE_URL, DEFAULT_DIMENSIONS, DEFAULT_MODEL};
pub use provider::{
    CachedEmbeddings, DisabledEmbeddings, EmbeddingError, EmbeddingOutcome, EmbeddingProvider,
    DEFAULT_QUERY_CACHE_SIZE,
};
pub use vector::{cosine_distance, cosine_similarity, truncate_text, Embedding, MAX_TEXT_LENGTH};
