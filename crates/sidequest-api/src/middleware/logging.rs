use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Wire error code of a failed exchange, attached to the response so the
/// request log can name it without reading the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub String);

/// Log one line per request, keyed by route template.
///
/// Observer socket upgrades and event streams are logged when the
/// connection opens; the connection itself logs its own lifetime.
pub async fn log_request(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().clone();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status == StatusCode::SWITCHING_PROTOCOLS || route == "/events" {
        tracing::debug!(route = %route, status = %status, "Stream opened");
        return response;
    }

    match response.extensions().get::<ErrorCode>() {
        Some(ErrorCode(code)) if status.is_server_error() => {
            tracing::warn!(%method, route = %route, %status, error = %code, elapsed_ms, "Request failed");
        }
        Some(ErrorCode(code)) => {
            tracing::info!(%method, route = %route, %status, error = %code, elapsed_ms, "Request rejected");
        }
        None => {
            tracing::info!(%method, route = %route, %status, elapsed_ms, "Request handled");
        }
    }

    response
}
