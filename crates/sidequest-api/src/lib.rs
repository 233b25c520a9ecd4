//! HTTP and WebSocket front end for SideQuest
//!
//! Display Surfaces use the REST routes and the `/events` stream; observers
//! embedded in chat pages connect over `/observer`.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
