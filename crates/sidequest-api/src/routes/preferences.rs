use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sidequest_bus::BusError;
use sidequest_types::{Preferences, Theme};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct PanelWidthRequest {
    pub width: u32,
}

pub async fn get_preferences(State(state): State<Arc<AppState>>) -> ApiResult<Json<Preferences>> {
    Ok(Json(state.display.preferences().await?))
}

pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ThemeRequest>,
) -> ApiResult<Json<Preferences>> {
    Ok(Json(state.display.set_theme(req.theme).await?))
}

/// Width is clamped to the supported range
pub async fn set_panel_width(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PanelWidthRequest>,
) -> ApiResult<Json<Preferences>> {
    Ok(Json(state.display.set_panel_width(req.width).await?))
}

pub async fn minimize_sidebar(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    sidebar_status(state.display.minimize_sidebar().await)
}

pub async fn restore_sidebar(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    sidebar_status(state.display.restore_sidebar().await)
}

// The flag is persisted even when no page is attached to apply it.
fn sidebar_status(result: Result<(), BusError>) -> ApiResult<StatusCode> {
    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(BusError::NoActiveTarget) => Ok(StatusCode::ACCEPTED),
        Err(e) => Err(e.into()),
    }
}
