use sidequest_types::Response;
use thiserror::Error;

/// Failures surfaced to callers as `{ok:false, error}`.
///
/// `Display` is the wire error string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("no-active-target")]
    NoActiveTarget,

    #[error("not-found")]
    NotFound,

    #[error("no-bubble")]
    NoBubble,

    #[error("empty-text")]
    EmptyText,

    #[error("timeout")]
    Timeout,

    #[error("channel-closed")]
    ChannelClosed,

    #[error("{0}")]
    Handler(String),
}

impl BusError {
    /// Inverse of `Display`; unknown strings become [`BusError::Handler`]
    pub fn from_wire(error: &str) -> Self {
        match error {
            "no-active-target" => BusError::NoActiveTarget,
            "not-found" => BusError::NotFound,
            "no-bubble" => BusError::NoBubble,
            "empty-text" => BusError::EmptyText,
            "timeout" => BusError::Timeout,
            "channel-closed" => BusError::ChannelClosed,
            other => BusError::Handler(other.to_string()),
        }
    }

    /// Error carried by a failed response, if any
    pub fn from_response(response: &Response) -> Option<Self> {
        if response.ok {
            return None;
        }
        Some(Self::from_wire(response.error().unwrap_or("unknown error")))
    }
}

impl From<BusError> for Response {
    fn from(error: BusError) -> Self {
        Response::failure(error)
    }
}

pub type Result<T> = std::result::Result<T, BusError>;
