//! # Storymem Core
//!
//! Story memory engine for personalised reading. Keeps track of:
//!
//! - **Child profiles**: name, age, interests and a reading level that grows
//!   with strong comprehension feedback
//! - **Stories**: generated text with summary, keywords and an optional
//!   semantic embedding computed at write time
//! - **Feedback**: ratings and comprehension scores per story
//!
//! ## Search
//!
//! Story search blends two strategies:
//!
//! - **Semantic**: the query is embedded and stories are ranked by cosine
//!   distance to it
//! - **Keyword fallback**: when the embedding provider is unavailable, stories
//!   are matched on keywords and summary text
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storymem_core::{DisabledEmbeddings, NewChild, Storage, StoryMemory};
//!
//! let storage = Arc::new(Storage::new(None)?);
//! let memory = StoryMemory::new(storage, Arc::new(DisabledEmbeddings));
//!
//! let id = memory.create_child(NewChild {
//!     name: "Alice".to_string(),
//!     age: 7,
//!     reading_level: Some(2),
//!     interests: vec!["dragons".to_string()],
//! }).await?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod embeddings;
pub mod model;
pub mod search;
pub mod service;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use model::{
    Child, FeedbackReceipt, NewChild, NewFeedback, NewStory, Progress, ProgressStats, Story, DEFAULT_READING_LEVEL, LEVEL_UP_THRESHOLD, MAX_READING_LEVEL, MIN_READING_LEVEL,
};

pub use embeddings::{
    CachedEmbeddings, DisabledEmbeddings, Embedding, EmbeddingError, EmbeddingOutcome,
    EmbeddingProvider, OpenAiConfig, OpenAiEmbeddings,
};

pub use search::{SearchHit, SearchRequest, SearchStrategy};

pub use service::{HealthReport, StoryMemory};

pub use storage::{Result, Storage, StorageError, StorageStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
