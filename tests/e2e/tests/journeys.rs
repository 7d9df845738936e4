//! Journey tests
//!
//! Whole workflows through `StoryMemory` against a real SQLite file.

use std::sync::Arc;

use storymem_core::{NewFeedback, SearchRequest, StorageError, MAX_READING_LEVEL};
use storymem_e2e_tests::harness::TestMemory;
use storymem_e2e_tests::mocks::{alice, child_named, story, FailingEmbedder, KeywordAxisEmbedder};

fn feedback(story_id: i64, child_id: i64, rating: i32, comprehension_score: i32) -> NewFeedback {
    NewFeedback {
        story_id,
        child_id,
        rating,
        comprehension_score,
    }
}

fn search(child_id: i64, query: Option<&str>, limit: Option<i64>) -> SearchRequest {
    SearchRequest {
        child_id,
        query: query.map(str::to_string),
        limit,
    }
}

// ============================================================================
// PROFILE -> STORY -> FEEDBACK -> PROGRESS
// ============================================================================

#[tokio::test]
async fn test_reading_session_levels_up_child() {
    let db = TestMemory::with_embeddings(KeywordAxisEmbedder::new());

    let child_id = db.memory.create_child(alice()).await.unwrap();
    assert_eq!(child_id, 1);

    let story_id = db
        .memory
        .save_story(story(child_id, "Alice befriends a dragon", &["dragons", "friendship"]))
        .await
        .unwrap();
    assert_eq!(story_id, 1);

    let receipt = db
        .memory
        .save_feedback(feedback(story_id, child_id, 5, 85))
        .await
        .unwrap();
    assert!(receipt.reading_level_raised);

    let child = db.memory.get_child(child_id).await.unwrap();
    assert_eq!(child.reading_level, 3);
    assert_eq!(child.interests, vec!["dragons", "space"]);

    let progress = db.memory.get_progress(child_id).await.unwrap();
    assert_eq!(progress.child.reading_level, 3);
    assert_eq!(progress.stats.story_count, 1);
    assert_eq!(progress.stats.feedback_count, 1);
    assert_eq!(progress.stats.avg_rating, Some(5.0));
    assert_eq!(progress.stats.avg_comprehension, Some(85.0));
}

#[tokio::test]
async fn test_comprehension_at_threshold_keeps_level() {
    let db = TestMemory::new_temp();
    let child_id = db.memory.create_child(alice()).await.unwrap();
    let story_id = db
        .memory
        .save_story(story(child_id, "A quiet forest walk", &["forest"]))
        .await
        .unwrap();

    let receipt = db
        .memory
        .save_feedback(feedback(story_id, child_id, 3, 80))
        .await
        .unwrap();
    assert!(!receipt.reading_level_raised);
    assert_eq!(db.memory.get_child(child_id).await.unwrap().reading_level, 2);
}

#[tokio::test]
async fn test_reading_level_caps_at_ten() {
    let db = TestMemory::new_temp();
    let mut input = alice();
    input.reading_level = Some(9);
    let child_id = db.memory.create_child(input).await.unwrap();
    let story_id = db
        .memory
        .save_story(story(child_id, "Robots in the library", &["robot"]))
        .await
        .unwrap();

    for _ in 0..3 {
        db.memory
            .save_feedback(feedback(story_id, child_id, 5, 100))
            .await
            .unwrap();
    }

    let progress = db.memory.get_progress(child_id).await.unwrap();
    assert_eq!(progress.child.reading_level, MAX_READING_LEVEL);
    assert_eq!(progress.stats.feedback_count, 3);
    assert_eq!(progress.stats.story_count, 1);
}

#[tokio::test]
async fn test_progress_without_feedback_has_no_averages() {
    let db = TestMemory::new_temp();
    let child_id = db.memory.create_child(child_named("Ben")).await.unwrap();
    db.memory
        .save_story(story(child_id, "Ben and the ocean", &["ocean"]))
        .await
        .unwrap();

    let progress = db.memory.get_progress(child_id).await.unwrap();
    assert_eq!(progress.child.reading_level, 1);
    assert_eq!(progress.stats.story_count, 1);
    assert_eq!(progress.stats.feedback_count, 0);
    assert_eq!(progress.stats.avg_rating, None);
    assert_eq!(progress.stats.avg_comprehension, None);
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let db = TestMemory::new_temp();
    assert!(matches!(
        db.memory.get_child(42).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        db.memory.get_progress(42).await,
        Err(StorageError::NotFound(_))
    ));

    let child_id = db.memory.create_child(alice()).await.unwrap();
    assert!(matches!(
        db.memory.latest_story(child_id).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_story_for_unknown_child_is_rejected() {
    let db = TestMemory::new_temp();
    let err = db
        .memory
        .save_story(story(99, "Nobody's story", &[]))
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());

    let err = db
        .memory
        .save_feedback(feedback(1, 99, 3, 50))
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
}

// ============================================================================
// LISTING & SEARCH
// ============================================================================

#[tokio::test]
async fn test_search_without_query_matches_listing() {
    let db = TestMemory::with_embeddings(KeywordAxisEmbedder::new());
    let child_id = db.memory.create_child(alice()).await.unwrap();
    for n in 0..7 {
        db.memory
            .save_story(story(child_id, &format!("Space trip number {}", n), &["space"]))
            .await
            .unwrap();
    }

    let listed = db.memory.list_stories(child_id, None).await.unwrap();
    assert_eq!(listed.len(), 7);
    let listed_ids: Vec<i64> = listed.iter().map(|s| s.id).collect();
    assert_eq!(listed_ids, vec![7, 6, 5, 4, 3, 2, 1]);

    let hits = db.memory.search(search(child_id, None, None)).await.unwrap();
    let hit_ids: Vec<i64> = hits.iter().map(|h| h.story.id).collect();
    assert_eq!(hit_ids, listed_ids[..5]);
    assert!(hits.iter().all(|h| h.distance.is_none()));

    // whitespace-only query is the same as no query
    let blank = db
        .memory
        .search(search(child_id, Some("   "), Some(3)))
        .await
        .unwrap();
    let blank_ids: Vec<i64> = blank.iter().map(|h| h.story.id).collect();
    assert_eq!(blank_ids, vec![7, 6, 5]);

    let latest = db.memory.latest_story(child_id).await.unwrap();
    assert_eq!(latest.id, 7);
}

#[tokio::test]
async fn test_listing_limit_is_clamped() {
    let db = TestMemory::new_temp();
    let child_id = db.memory.create_child(alice()).await.unwrap();
    for n in 0..3 {
        db.memory
            .save_story(story(child_id, &format!("Forest tale {}", n), &["forest"]))
            .await
            .unwrap();
    }

    assert!(db.memory.list_stories(child_id, Some(0)).await.unwrap().is_empty());
    assert!(db.memory.list_stories(child_id, Some(-5)).await.unwrap().is_empty());
    assert_eq!(db.memory.list_stories(child_id, Some(1)).await.unwrap().len(), 1);
    assert_eq!(db.memory.list_stories(child_id, Some(1000)).await.unwrap().len(), 3);

    let recent = db.memory.search(search(child_id, None, Some(0))).await.unwrap();
    assert!(recent.is_empty());
    let fallback = db
        .memory
        .search(search(child_id, Some("forest"), Some(0)))
        .await
        .unwrap();
    assert!(fallback.is_empty());
}

#[tokio::test]
async fn test_semantic_search_ranks_by_theme() {
    let embedder = Arc::new(KeywordAxisEmbedder::new());
    let db = TestMemory::with_embeddings(Arc::clone(&embedder));
    let child_id = db.memory.create_child(alice()).await.unwrap();

    let dragon = db
        .memory
        .save_story(story(child_id, "A dragon guards the hill", &["dragon"]))
        .await
        .unwrap();
    let space = db
        .memory
        .save_story(story(child_id, "Rockets to space", &["space"]))
        .await
        .unwrap();
    let ocean = db
        .memory
        .save_story(story(child_id, "Under the ocean", &["ocean"]))
        .await
        .unwrap();
    assert_eq!(embedder.calls(), 3);

    let hits = db
        .memory
        .search(search(child_id, Some("space adventure"), Some(3)))
        .await
        .unwrap();
    assert_eq!(embedder.calls(), 4);
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].story.id, space);
    assert!(hits[0].distance.unwrap() < 1e-4);
    assert!(hits.iter().all(|h| h.distance.is_some()));
    assert!(hits.iter().any(|h| h.story.id == dragon));
    assert!(hits.iter().any(|h| h.story.id == ocean));

    let top = db
        .memory
        .search(search(child_id, Some("dragon"), Some(1)))
        .await
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].story.id, dragon);
}

#[tokio::test]
async fn test_stories_without_embedding_rank_last() {
    let db = TestMemory::with_embeddings(KeywordAxisEmbedder::new());
    let child_id = db.memory.create_child(alice()).await.unwrap();

    let unembedded = db
        .storage
        .insert_story(&story(child_id, "Ocean without a vector", &["ocean"]), None)
        .unwrap();
    assert!(!unembedded.has_embedding);
    db.memory
        .save_story(story(child_id, "Deep ocean whales", &["ocean"]))
        .await
        .unwrap();
    db.memory
        .save_story(story(child_id, "A robot builds a boat", &["robot"]))
        .await
        .unwrap();

    let hits = db
        .memory
        .search(search(child_id, Some("ocean"), Some(10)))
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    let last = hits.last().unwrap();
    assert_eq!(last.story.id, unembedded.id);
    assert!(last.distance.is_none());
}

#[tokio::test]
async fn test_keyword_fallback_when_provider_is_down() {
    let embedder = Arc::new(FailingEmbedder::new());
    let db = TestMemory::with_embeddings(Arc::clone(&embedder));
    let child_id = db.memory.create_child(alice()).await.unwrap();

    // saving still succeeds without an embedding
    let castle = db
        .memory
        .save_story(story(child_id, "A dragon adventure", &["dragons", "castle"]))
        .await
        .unwrap();
    let rocket = db
        .memory
        .save_story(story(child_id, "Trip to the moon", &["Space", "rockets"]))
        .await
        .unwrap();
    db.memory
        .save_story(story(child_id, "Ocean tale", &["ocean"]))
        .await
        .unwrap();
    assert_eq!(embedder.calls(), 3);
    assert!(!db.memory.latest_story(child_id).await.unwrap().has_embedding);

    // keyword equality ignores case
    let hits = db
        .memory
        .search(search(child_id, Some("space"), None))
        .await
        .unwrap();
    let ids: Vec<i64> = hits.iter().map(|h| h.story.id).collect();
    assert_eq!(ids, vec![rocket]);

    // keywords must match whole, summaries match by substring
    let hits = db
        .memory
        .search(search(child_id, Some("DRAG"), None))
        .await
        .unwrap();
    let ids: Vec<i64> = hits.iter().map(|h| h.story.id).collect();
    assert_eq!(ids, vec![castle]);

    let hits = db
        .memory
        .search(search(child_id, Some("castle"), None))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].distance.is_none());

    let none = db
        .memory
        .search(search(child_id, Some("volcano"), None))
        .await
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(embedder.calls(), 7);
}

#[tokio::test]
async fn test_children_do_not_see_each_other() {
    let db = TestMemory::with_embeddings(KeywordAxisEmbedder::new());
    let alice_id = db.memory.create_child(alice()).await.unwrap();
    let ben_id = db.memory.create_child(child_named("Ben")).await.unwrap();

    db.memory
        .save_story(story(alice_id, "Alice in space", &["space"]))
        .await
        .unwrap();
    let ben_story = db
        .memory
        .save_story(story(ben_id, "Ben in the forest", &["forest"]))
        .await
        .unwrap();

    let listed = db.memory.list_stories(ben_id, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, ben_story);

    let hits = db
        .memory
        .search(search(ben_id, Some("space"), Some(10)))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].story.child_id, ben_id);

    let progress = db.memory.get_progress(alice_id).await.unwrap();
    assert_eq!(progress.stats.story_count, 1);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let db = TestMemory::with_embeddings(KeywordAxisEmbedder::new());
    let child_id = db.memory.create_child(alice()).await.unwrap();
    db.memory
        .save_story(story(child_id, "Dragon stars", &["dragon", "space"]))
        .await
        .unwrap();

    let reopened = db.reopen();
    let child = reopened.get_child(child_id).unwrap().unwrap();
    assert_eq!(child.name, "Alice");
    let latest = reopened.latest_story(child_id).unwrap().unwrap();
    assert!(latest.has_embedding);
    assert_eq!(latest.embedding.unwrap().dimensions, 6);
    assert!(db.db_path().exists());
}
