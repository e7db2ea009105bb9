//! API key authentication for `/api` routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared secret the middleware checks against.
#[derive(Clone)]
pub struct ApiKey(pub Arc<String>);

/// Per-request authentication result, inserted as a request extension.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub authenticated_at: DateTime<Utc>,
}

/// Extract a bearer token. Accepts `Authorization: Bearer <token>` only.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|text| text.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that requires `Authorization: Bearer <api_key>`.
///
/// Every failure, including a missing header, is a 403. An empty configured
/// key matches nothing.
pub async fn require_api_key(
    State(api_key): State<ApiKey>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorized = match extract_bearer_token(request.headers()) {
        Some(token) => !api_key.0.is_empty() && token == api_key.0.as_str(),
        None => false,
    };

    if !authorized {
        tracing::debug!(
            "Rejected {} {}: invalid API key",
            request.method(),
            request.uri().path()
        );
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "message": "Forbidden",
                "error": "Invalid API key"
            })),
        )
            .into_response();
    }

    request.extensions_mut().insert(AuthContext {
        authenticated_at: Utc::now(),
    });
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted_and_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer  secret "));
        assert_eq!(extract_bearer_token(&headers), Some("secret"));
    }

    #[test]
    fn raw_or_empty_tokens_are_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("secret"));
        assert_eq!(extract_bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
