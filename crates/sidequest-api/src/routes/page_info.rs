use axum::{extract::State, Json};
use sidequest_bus::BusError;
use sidequest_types::PageInfo;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Last page info announced by an observer
pub async fn get_page_info(State(state): State<Arc<AppState>>) -> ApiResult<Json<PageInfo>> {
    state
        .display
        .page_info()
        .await?
        .map(Json)
        .ok_or(ApiError::Bus(BusError::NotFound))
}
