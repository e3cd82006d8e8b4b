//! Authentication middleware for axum.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::ApiKeyValidator;

/// Body returned on authentication failures.
#[derive(Debug, Serialize)]
pub struct AuthError {
    pub error: String,
    pub code: String,
}

impl AuthError {
    fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Reject requests without a valid API key.
///
/// Reads `X-API-Key`, falling back to `Authorization: Bearer <key>`. The
/// matched [`ApiKeyInfo`](crate::auth::ApiKeyInfo) is stored in the request
/// extensions.
pub async fn require_api_key(
    State(validator): State<ApiKeyValidator>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let api_key = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
        .map(str::to_string)
        .ok_or_else(|| AuthError::new("Missing API key", "MISSING_API_KEY"))?;

    let key_info = validator.validate(&api_key).await.ok_or_else(|| {
        let prefix: String = api_key.chars().take(6).collect();
        tracing::warn!(key_prefix = %prefix, "Invalid API key attempted");
        AuthError::new("Invalid API key", "INVALID_API_KEY")
    })?;

    tracing::debug!(client_id = %key_info.client_id, "Authenticated dashboard client");
    request.extensions_mut().insert(key_info);

    Ok(next.run(request).await)
}
