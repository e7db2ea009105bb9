//! User registration and lookup.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use securepaths_core::{NewUser, StoreError, User};
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::routes::json_body;
use crate::state::AppState;

const INVALID_USER: &str = "Invalid user data";

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let body = json_body(body, INVALID_USER)?;
    let new_user =
        NewUser::from_json(&body).map_err(|errors| ApiError::validation(INVALID_USER, errors))?;

    match state.storage().create_user(new_user) {
        Ok(user) => {
            tracing::info!("Registered user '{}' ({})", user.username, user.id);
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(StoreError::Conflict(_)) => Err(ApiError::Conflict("Username already exists")),
        Err(err) => Err(ApiError::storage("Failed to register user", err)),
    }
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state
        .storage()
        .get_user(&id)
        .map_err(|err| ApiError::storage("Failed to get user", err))?
        .map(Json)
        .ok_or(ApiError::NotFound("User not found"))
}
