//! API endpoint handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use storymem_core::{
    Child, HealthReport, NewChild, NewFeedback, NewStory, Progress, SearchHit, SearchRequest,
    Story,
};

use super::error::ApiError;
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// CHILDREN
// ============================================================================

/// POST /children
pub async fn create_child(
    State(state): State<AppState>,
    body: Result<Json<NewChild>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = body?;
    let id = state.memory.create_child(input).await?;
    Ok(Json(json!({ "id": id, "message": "Child profile created" })))
}

/// GET /children/{id}
pub async fn get_child(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Child> {
    let Path(id) = id?;
    Ok(Json(state.memory.get_child(id).await?))
}

// ============================================================================
// STORIES
// ============================================================================

/// POST /stories
pub async fn save_story(
    State(state): State<AppState>,
    body: Result<Json<NewStory>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = body?;
    let id = state.memory.save_story(input).await?;
    Ok(Json(json!({ "id": id, "message": "Story saved" })))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// GET /stories/{child_id}
pub async fn list_stories(
    State(state): State<AppState>,
    child_id: Result<Path<i64>, PathRejection>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<Story>> {
    let Path(child_id) = child_id?;
    let Query(params) = params?;
    Ok(Json(state.memory.list_stories(child_id, params.limit).await?))
}

/// GET /stories/latest/{child_id}
pub async fn latest_story(
    State(state): State<AppState>,
    child_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Story> {
    let Path(child_id) = child_id?;
    Ok(Json(state.memory.latest_story(child_id).await?))
}

/// GET /stories/search
pub async fn search_stories(
    State(state): State<AppState>,
    params: Result<Query<SearchRequest>, QueryRejection>,
) -> ApiResult<Vec<SearchHit>> {
    let Query(request) = params?;
    Ok(Json(state.memory.search(request).await?))
}

// ============================================================================
// FEEDBACK & PROGRESS
// ============================================================================

/// POST /feedback
pub async fn save_feedback(
    State(state): State<AppState>,
    body: Result<Json<NewFeedback>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = body?;
    let receipt = state.memory.save_feedback(input).await?;
    Ok(Json(json!({
        "id": receipt.id,
        "message": "Feedback saved",
        "reading_level_raised": receipt.reading_level_raised,
    })))
}

/// GET /progress/{child_id}
pub async fn get_progress(
    State(state): State<AppState>,
    child_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Progress> {
    let Path(child_id) = child_id?;
    Ok(Json(state.memory.get_progress(child_id).await?))
}

// ============================================================================
// HEALTH
// ============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.memory.health().await)
}
