//! Stories and their embedding text

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedding;

/// A stored story
///
/// The embedding vector stays server-side; responses only say whether one
/// was computed.
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    pub id: i64,
    pub child_id: i64,
    pub story_text: String,
    pub difficulty: i32,
    pub summary: String,
    pub keywords: Vec<String>,
    #[serde(skip)]
    pub embedding: Option<Embedding>,
    pub has_embedding: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for saving a story
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStory {
    pub child_id: i64,
    pub story_text: String,
    pub difficulty: i32,
    pub summary: String,
    pub keywords: Vec<String>,
}

impl NewStory {
    /// Text sent to the embedding provider: the summary followed by the keywords
    pub fn embedding_text(&self) -> String {
        let text = format!("{} {}", self.summary, self.keywords.join(" "));
        text.trim().to_string()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.story_text.trim().is_empty() && self.summary.trim().is_empty() {
            return Err("story_text and summary must not both be empty".to_string());
        }
        Ok(())
    }
}
