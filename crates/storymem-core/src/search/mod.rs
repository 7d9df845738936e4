//! Search Module
//!
//! Story search for a single child:
//! - No query: most recent stories
//! - Query with an embedding: ranked by cosine distance
//! - Query without an embedding: keyword / summary matching

mod keyword;
mod semantic;

pub use keyword::filter as keyword_filter;
pub use semantic::rank as semantic_rank;

use serde::{Deserialize, Serialize};

use crate::model::Story;

/// Default number of stories returned by a listing
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Default number of stories returned by a search
pub const DEFAULT_SEARCH_LIMIT: i64 = 5;

/// Upper bound for any caller-supplied limit
pub const MAX_LIMIT: i64 = 100;

/// Clamp a caller-supplied limit into `0..=MAX_LIMIT`; zero or less yields nothing
pub fn clamp_limit(limit: Option<i64>, default: i64) -> usize {
    limit.unwrap_or(default).clamp(0, MAX_LIMIT) as usize
}

/// A story search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub child_id: i64,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchRequest {
    /// The query text, if there is any worth searching for
    pub fn effective_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub fn effective_limit(&self) -> usize {
        clamp_limit(self.limit, DEFAULT_SEARCH_LIMIT)
    }
}

/// Which path a search took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    Recent,
    Semantic,
    Keyword,
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStrategy::Recent => write!(f, "recent"),
            SearchStrategy::Semantic => write!(f, "semantic"),
            SearchStrategy::Keyword => write!(f, "keyword"),
        }
    }
}

/// A story in a result list
///
/// `distance` is set only by semantic ranking, and only for stories whose
/// embedding could be compared with the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub story: Story,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

impl From<Story> for SearchHit {
    fn from(story: Story) -> Self {
        Self {
            story,
            distance: None,
        }
    }
}
