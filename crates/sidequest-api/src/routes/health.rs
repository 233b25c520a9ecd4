use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_observer: Option<String>,
}

/// Health check endpoint
///
/// Reports whether storage answers and which observer (if any) is active.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    match state.service.persist().storage().keys().await {
        Ok(_) => services.insert("storage".to_string(), "available".to_string()),
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            services.insert("storage".to_string(), "unavailable".to_string())
        }
    };

    let observers = state.service.observers().ids().await;
    services.insert("observers".to_string(), observers.len().to_string());

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
        active_observer: state.service.observers().active_id().await,
    }))
}
