//! Keyword fallback matching
//!
//! A story matches when one of its keywords equals the whole query, or its
//! summary contains the query. Both comparisons ignore case.

use crate::model::Story;

/// Whether a story matches the fallback rules for `query`
fn matches(story: &Story, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    story
        .keywords
        .iter()
        .any(|k| k.trim().to_lowercase() == needle)
        || story.summary.to_lowercase().contains(&needle)
}

/// Keep matching stories, preserving the input (recency) order
pub fn filter(stories: Vec<Story>, query: &str, limit: usize) -> Vec<Story> {
    stories
        .into_iter()
        .filter(|s| matches(s, query))
        .take(limit)
        .collect()
}
