//! Vector ranking
//!
//! Stories are ordered by ascending cosine distance to the query. Stories
//! with no comparable embedding go after all ranked ones, keeping the input
//! (recency) order, the same place NULL distances sort in the reference
//! datastore.

use std::cmp::Ordering;

use super::SearchHit;
use crate::embeddings::Embedding;
use crate::model::Story;

/// Rank `stories` (newest first) against `query`, truncated to `limit`
pub fn rank(stories: Vec<Story>, query: &Embedding, limit: usize) -> Vec<SearchHit> {
    let mut scored: Vec<(usize, SearchHit)> = stories
        .into_iter()
        .enumerate()
        .map(|(position, story)| {
            let distance = story
                .embedding
                .as_ref()
                .and_then(|embedding| embedding.distance_to(query))
                .filter(|d| d.is_finite());
            (position, SearchHit { story, distance })
        })
        .collect();

    scored.sort_by(|(pos_a, a), (pos_b, b)| match (a.distance, b.distance) {
        (Some(da), Some(db)) => da
            .partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then(pos_a.cmp(pos_b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => pos_a.cmp(pos_b),
    });

    scored.into_iter().take(limit).map(|(_, hit)| hit).collect()
}
