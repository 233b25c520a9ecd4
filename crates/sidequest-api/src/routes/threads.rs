use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sidequest_types::{Message, Role, Thread, ThreadCollection};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RenameThreadRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    pub text: String,
}

/// List every thread, newest first
pub async fn list_threads(State(state): State<Arc<AppState>>) -> ApiResult<Json<ThreadCollection>> {
    Ok(Json(state.display.list_threads().await?))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Thread>> {
    let mut collection = state.display.list_threads().await?;
    collection
        .threads
        .remove(&thread_id)
        .map(Json)
        .ok_or(ApiError::ThreadNotFound(thread_id))
}

pub async fn rename_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<RenameThreadRequest>,
) -> ApiResult<StatusCode> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }

    state.display.rename(&thread_id, &req.title).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a thread; unknown ids are not an error
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.display.delete(&thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_threads(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.display.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn append_message(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<AppendMessageRequest>,
) -> ApiResult<StatusCode> {
    state
        .display
        .append_message(&thread_id, Message::new(req.role, req.content))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Scroll the active page to the thread's answer
pub async fn jump_to_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.display.jump_to_thread(&thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a follow-up question on the thread and type it into the page
pub async fn send_followup(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<FollowupRequest>,
) -> ApiResult<StatusCode> {
    state.display.send_followup(Some(&thread_id), &req.text).await?;
    Ok(StatusCode::NO_CONTENT)
}
