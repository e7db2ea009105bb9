//! Error responses for the REST API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use securepaths_core::{FieldError, StoreError, ValidationErrors};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request fields
    #[error("{message}")]
    Validation {
        message: &'static str,
        errors: Vec<FieldError>,
    },

    /// Missing or unparsable query parameters
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// Upstream provider failure with no local fallback
    #[error("{message}: {cause:#}")]
    Upstream {
        message: &'static str,
        cause: anyhow::Error,
    },

    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    pub fn validation(message: &'static str, errors: ValidationErrors) -> Self {
        ApiError::Validation {
            message,
            errors: errors.0,
        }
    }

    pub fn upstream(message: &'static str, cause: anyhow::Error) -> Self {
        ApiError::Upstream { message, cause }
    }

    pub fn storage(message: &'static str, source: StoreError) -> Self {
        ApiError::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { .. } | ApiError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation { message, errors } => {
                json!({ "message": message, "errors": errors })
            }
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => json!({ "message": message }),
            ApiError::Upstream { message, cause } => {
                tracing::error!("{}: {:#}", message, cause);
                json!({ "message": message, "error": format!("{:#}", cause) })
            }
            ApiError::Storage { message, source } => {
                tracing::error!("{}: {}", message, source);
                json!({ "message": message, "error": source.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
