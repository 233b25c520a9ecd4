use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sidequest_types::Locator;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub thread_id: Option<String>,
    /// `bubble` or `selection`
    pub via: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpRequest {
    #[serde(default)]
    pub locator: Option<Locator>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub fallback_text: Option<String>,
}

/// Bookmark the latest answer on the active page
pub async fn capture_latest(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<CaptureResponse>)> {
    let response = state.display.capture_latest().await?;

    Ok((
        StatusCode::CREATED,
        Json(CaptureResponse {
            thread_id: response.thread_id,
            via: response.via,
        }),
    ))
}

/// Jump to an explicit locator and/or fallback text
pub async fn jump(State(state): State<Arc<AppState>>, Json(req): Json<JumpRequest>) -> ApiResult<StatusCode> {
    state
        .display
        .jump_to(req.locator, req.thread_id.as_deref(), req.fallback_text.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
