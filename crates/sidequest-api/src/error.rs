use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sidequest_bus::BusError;
use sidequest_persist::PersistError;
use thiserror::Error;

use crate::middleware::logging::ErrorCode;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A failed bus exchange; the body carries the wire error code
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn bus_status(error: &BusError) -> StatusCode {
        match error {
            BusError::NotFound => StatusCode::NOT_FOUND,
            BusError::NoActiveTarget => StatusCode::SERVICE_UNAVAILABLE,
            BusError::NoBubble => StatusCode::UNPROCESSABLE_ENTITY,
            BusError::EmptyText => StatusCode::BAD_REQUEST,
            BusError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            BusError::ChannelClosed => StatusCode::BAD_GATEWAY,
            BusError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short code for the request log
    fn code(&self) -> String {
        match self {
            ApiError::ThreadNotFound(_) => "not-found".to_string(),
            ApiError::BadRequest(_) => "bad-request".to_string(),
            ApiError::Bus(BusError::Handler(_)) => "handler".to_string(),
            ApiError::Bus(e) => e.to_string(),
            ApiError::Persist(_) => "storage".to_string(),
            ApiError::Internal => "internal".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = ErrorCode(self.code());
        let (status, message) = match self {
            ApiError::ThreadNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Bus(ref e) => {
                let status = Self::bus_status(e);
                if status.is_server_error() {
                    tracing::warn!("Bus error: {}", e);
                }
                (status, e.to_string())
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Internal => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(code);
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_errors_keep_their_wire_code() {
        let response = ApiError::Bus(BusError::NoActiveTarget).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.extensions().get::<ErrorCode>(),
            Some(&ErrorCode("no-active-target".to_string()))
        );

        let response = ApiError::Bus(BusError::Handler("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.extensions().get::<ErrorCode>(), Some(&ErrorCode("handler".to_string())));
    }

    #[test]
    fn test_thread_not_found_is_404() {
        let response = ApiError::ThreadNotFound("t-9".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.extensions().get::<ErrorCode>(), Some(&ErrorCode("not-found".to_string())));
    }
}
