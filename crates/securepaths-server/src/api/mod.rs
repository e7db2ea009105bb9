//! API routes for the SecurePaths server.

pub mod auth;
pub mod error;
pub mod request_id;
mod routes;
pub mod safety;
pub mod users;

use crate::config::Config;
use axum::Router;

pub use error::ApiError;

pub fn routes(config: &Config) -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router(config)
}

#[cfg(test)]
mod tests;
