//! Feedback and reading progress

use serde::{Deserialize, Serialize};

use super::child::{Child, LEVEL_UP_THRESHOLD};

/// Input for submitting feedback
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFeedback {
    pub story_id: i64,
    pub child_id: i64,
    pub rating: i32,
    pub comprehension_score: i32,
}

impl NewFeedback {
    /// Whether this feedback should raise the child's reading level
    pub fn earns_level_up(&self) -> bool {
        self.comprehension_score > LEVEL_UP_THRESHOLD
    }
}

/// Outcome of saving feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackReceipt {
    pub id: i64,
    /// False when the score was too low or the child was already at the ceiling
    pub reading_level_raised: bool,
}

/// Aggregates across a child's stories and their feedback
///
/// Averages are `None` when there is nothing to average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStats {
    pub story_count: i64,
    pub feedback_count: i64,
    pub avg_rating: Option<f64>,
    pub avg_comprehension: Option<f64>,
}

/// A child's profile together with their reading statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub child: Child,
    pub stats: ProgressStats,
}
