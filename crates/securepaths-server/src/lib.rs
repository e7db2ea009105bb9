//! Shared library surface for the SecurePaths server and its tests.

pub mod api;
pub mod config;
pub mod search;
pub mod state;

use axum::{http::{header, HeaderValue, Method}, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Build the full application: `/api` routes, health check and the
/// request-id, tracing and CORS layers.
pub fn build_app(config: &Config, state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(api::routes(config)
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(middleware::from_fn(api::request_id::ensure_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
