use axum::{extract::State, Extension, Json};
use sidequest_types::{Request, Response};
use std::sync::Arc;

use crate::{middleware::logging::ErrorCode, state::AppState};

/// Send a raw request envelope to the Coordinator
///
/// Failures are returned in-band as `{ok:false, error}` with status 200,
/// the same shape a remote context sees over the WebSocket bridge.
pub async fn send_request(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Request>,
) -> (Option<Extension<ErrorCode>>, Json<Response>) {
    tracing::debug!(kind = request.kind(), "Raw request");
    let response = state.service.handle().call(request).await;
    let code = response.error().map(|code| Extension(ErrorCode(code.to_string())));
    (code, Json(response))
}
