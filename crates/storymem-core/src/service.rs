//! Story memory service
//!
//! Async facade over [`Storage`] and an [`EmbeddingProvider`]. This is the
//! layer request handlers talk to: it owns the embedding-then-write sequence
//! for stories and the choice of search strategy.

use std::sync::Arc;

use serde::Serialize;

use crate::embeddings::{EmbeddingOutcome, EmbeddingProvider};
use crate::model::{
    Child, FeedbackReceipt, NewChild, NewFeedback, NewStory, Progress, Story,
    DEFAULT_READING_LEVEL, MAX_READING_LEVEL, MIN_READING_LEVEL,
};
use crate::search::{
    self, clamp_limit, SearchHit, SearchRequest, SearchStrategy, DEFAULT_LIST_LIMIT,
};
use crate::storage::{Result, Storage, StorageError, StorageStats};

/// Liveness summary for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy` when the database answered, `degraded` otherwise
    pub status: &'static str,
    pub version: &'static str,
    pub embedding_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StorageStats>,
}

/// Story memory: profiles, stories, search and feedback
#[derive(Clone)]
pub struct StoryMemory {
    storage: Arc<Storage>,
    embeddings: Arc<dyn EmbeddingProvider>,
    default_reading_level: i32,
}

impl StoryMemory {
    pub fn new(storage: Arc<Storage>, embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            storage,
            embeddings,
            default_reading_level: DEFAULT_READING_LEVEL,
        }
    }

    /// Reading level for profiles created without one, clamped to the valid range
    pub fn with_default_reading_level(mut self, level: i32) -> Self {
        self.default_reading_level = level.clamp(MIN_READING_LEVEL, MAX_READING_LEVEL);
        self
    }

    pub fn default_reading_level(&self) -> i32 {
        self.default_reading_level
    }

    // ========================================================================
    // PROFILES
    // ========================================================================

    /// Create a child profile, returning its id
    pub async fn create_child(&self, input: NewChild) -> Result<i64> {
        let child = self
            .storage
            .create_child(&input, self.default_reading_level)?;
        tracing::info!(child_id = child.id, reading_level = child.reading_level, "Child profile created");
        Ok(child.id)
    }

    pub async fn get_child(&self, id: i64) -> Result<Child> {
        self.storage
            .get_child(id)?
            .ok_or_else(|| StorageError::NotFound("Child".to_string()))
    }

    // ========================================================================
    // STORIES
    // ========================================================================

    /// Save a story, embedding its summary and keywords first
    ///
    /// An unavailable embedding never fails the save; the story is stored
    /// without one and simply ranks last in semantic search.
    pub async fn save_story(&self, input: NewStory) -> Result<i64> {
        input.validate().map_err(StorageError::Validation)?;

        let outcome = self.embeddings.try_embed(&input.embedding_text()).await;
        let embedded = outcome.is_available();
        let embedding = outcome.into_embedding();

        let story = self.storage.insert_story(&input, embedding.as_ref())?;
        tracing::info!(
            story_id = story.id,
            child_id = story.child_id,
            embedded,
            "Story saved"
        );
        Ok(story.id)
    }

    pub async fn list_stories(&self, child_id: i64, limit: Option<i64>) -> Result<Vec<Story>> {
        self.storage
            .list_stories(child_id, clamp_limit(limit, DEFAULT_LIST_LIMIT))
    }

    pub async fn latest_story(&self, child_id: i64) -> Result<Story> {
        self.storage
            .latest_story(child_id)?
            .ok_or_else(|| StorageError::NotFound("Story".to_string()))
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Search a child's stories
    ///
    /// Without a query this is the recency listing. With one, the query is
    /// embedded; if that works stories are ranked by distance, otherwise the
    /// keyword fallback runs. Provider failures never reach the caller.
    pub async fn search(&self, request: SearchRequest) -> Result<Vec<SearchHit>> {
        let limit = request.effective_limit();

        let (strategy, hits): (SearchStrategy, Vec<SearchHit>) = match request.effective_query() {
            None => {
                let stories = self.storage.list_stories(request.child_id, limit)?;
                (
                    SearchStrategy::Recent,
                    stories.into_iter().map(SearchHit::from).collect(),
                )
            }
            Some(query) => match self.embeddings.try_embed(query).await {
                EmbeddingOutcome::Available(query_embedding) => {
                    let stories = self.storage.stories_for_child(request.child_id)?;
                    (
                        SearchStrategy::Semantic,
                        search::semantic_rank(stories, &query_embedding, limit),
                    )
                }
                EmbeddingOutcome::Unavailable { reason } => {
                    tracing::debug!(%reason, "Falling back to keyword search");
                    let stories = self.storage.stories_for_child(request.child_id)?;
                    (
                        SearchStrategy::Keyword,
                        search::keyword_filter(stories, query, limit)
                            .into_iter()
                            .map(SearchHit::from)
                            .collect(),
                    )
                }
            },
        };

        tracing::debug!(
            child_id = request.child_id,
            %strategy,
            results = hits.len(),
            "Story search"
        );
        Ok(hits)
    }

    // ========================================================================
    // FEEDBACK & PROGRESS
    // ========================================================================

    pub async fn save_feedback(&self, input: NewFeedback) -> Result<FeedbackReceipt> {
        self.storage.save_feedback(&input)
    }

    pub async fn get_progress(&self, child_id: i64) -> Result<Progress> {
        self.storage
            .get_progress(child_id)?
            .ok_or_else(|| StorageError::NotFound("Child".to_string()))
    }

    /// Never fails; a database error turns the report `degraded`
    pub async fn health(&self) -> HealthReport {
        let stats = match self.storage.get_stats() {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::error!("Health check could not read the database: {}", e);
                None
            }
        };
        HealthReport {
            status: if stats.is_some() { "healthy" } else { "degraded" },
            version: crate::VERSION,
            embedding_model: self.embedding_model().to_string(),
            stats,
        }
    }

    pub fn embedding_model(&self) -> &str {
        self.embeddings.model_name()
    }
}
