//! REST API routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use securepaths_core::{FieldError, Route, RouteSearchRequest, ValidationErrors};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::auth::{self, ApiKey, AuthContext};
use crate::api::error::ApiError;
use crate::api::request_id::RequestId;
use crate::api::{safety, users};
use crate::config::Config;
use crate::search::{search_routes, RouteSearchResponse};
use crate::state::AppState;

/// Create the API router. Everything under `/api` requires the API key.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let api_key = ApiKey(Arc::new(config.api_key.clone()));

    let api_routes = Router::new()
        .route("/routes/search", post(search_routes_handler))
        .route("/routes", get(list_routes))
        .route("/locations/suggest", get(suggest_locations))
        .route("/safety/report", post(safety::submit_report))
        .route("/safety/reports", get(safety::list_reports))
        .route("/users/register", post(users::register_user))
        .route("/users/:id", get(users::get_user))
        .layer(middleware::from_fn_with_state(api_key, auth::require_api_key));

    Router::new().nest("/api", api_routes)
}

/// Turn a body that is not valid JSON into a field-level validation error.
pub(crate) fn json_body(
    body: Result<Json<Value>, JsonRejection>,
    message: &'static str,
) -> Result<Value, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| ApiError::Validation {
        message,
        errors: vec![FieldError::new("body", rejection.body_text())],
    })
}

/// Query strings that fail to deserialize, such as a repeated key, are
/// reported with the handler's own message.
pub(crate) fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    message: &'static str,
) -> Result<T, ApiError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        ApiError::BadRequest(message)
    })
}

// === Request types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRoutesQuery {
    pub start_location: Option<String>,
    pub end_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub query: Option<String>,
}

// === Handlers ===

async fn search_routes_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RouteSearchResponse>, ApiError> {
    const INVALID: &str = "Invalid search request";
    let body = json_body(body, INVALID)?;
    let request = RouteSearchRequest::from_json(&body)
        .map_err(|errors| ApiError::validation(INVALID, errors))?;

    tracing::debug!(
        "Route search authenticated at {}",
        auth.authenticated_at.to_rfc3339()
    );

    search_routes(&state, &request)
        .await
        .map(Json)
        .map_err(|err| {
            if let Some(Extension(request_id)) = request_id {
                tracing::warn!("Route search {} failed while storing routes", request_id);
            }
            ApiError::storage("Failed to search routes", err)
        })
}

async fn list_routes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListRoutesQuery>, QueryRejection>,
) -> Result<Json<Vec<Route>>, ApiError> {
    const MISSING_LOCATIONS: &str = "Start and end locations are required";
    let query = query_params(query, MISSING_LOCATIONS)?;
    let mut missing = Vec::new();
    if query.start_location.is_none() {
        missing.push(FieldError::new("startLocation", "Required"));
    }
    if query.end_location.is_none() {
        missing.push(FieldError::new("endLocation", "Required"));
    }
    let (Some(start), Some(end)) = (query.start_location, query.end_location) else {
        return Err(ApiError::validation(
            MISSING_LOCATIONS,
            ValidationErrors(missing),
        ));
    };

    state
        .storage()
        .get_routes(&start, &end)
        .map(Json)
        .map_err(|err| ApiError::storage("Failed to get routes", err))
}

/// Relay upstream autocomplete predictions unmodified.
async fn suggest_locations(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    const MISSING_QUERY: &str = "Query parameter is required";
    let input = query_params(query, MISSING_QUERY)?
        .query
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::BadRequest(MISSING_QUERY))?;

    state
        .maps()
        .autocomplete(&input)
        .await
        .map(Json)
        .map_err(|err| ApiError::upstream("Failed to get location suggestions", err))
}
