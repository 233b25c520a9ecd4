use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{events, observer},
    middleware::logging,
    routes::{capture, health, page_info, preferences, requests, threads},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // Long-lived connections stay outside the request timeout
    let streaming_routes = Router::new()
        .route("/events", get(events::stream_events))
        .route("/observer", get(observer::observer_socket));

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads", get(threads::list_threads).delete(threads::clear_threads))
        .route(
            "/threads/:thread_id",
            get(threads::get_thread)
                .patch(threads::rename_thread)
                .delete(threads::delete_thread),
        )
        .route("/threads/:thread_id/messages", post(threads::append_message))
        .route("/threads/:thread_id/jump", post(threads::jump_to_thread))
        .route("/threads/:thread_id/followup", post(threads::send_followup))
        // Page actions
        .route("/capture-latest", post(capture::capture_latest))
        .route("/jump", post(capture::jump))
        .route("/sidebar/minimize", post(preferences::minimize_sidebar))
        .route("/sidebar/restore", post(preferences::restore_sidebar))
        .route("/page-info", get(page_info::get_page_info))
        // Preferences
        .route("/preferences", get(preferences::get_preferences))
        .route("/preferences/theme", put(preferences::set_theme))
        .route("/preferences/panel-width", put(preferences::set_panel_width))
        // Raw envelopes
        .route("/requests", post(requests::send_request))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CompressionLayer::new());

    Router::new()
        .merge(api_routes)
        .merge(streaming_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::new();
    }

    let mut cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
