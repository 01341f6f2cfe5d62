//! Authentication middleware

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::context::Principal;
use crate::core::constants::{HEADER_REMOTE_GROUPS, HEADER_REMOTE_USER};

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn invalid_header() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_HEADER_INVALID",
            message: "Identity headers must be valid UTF-8".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Debug, Clone, Copy)]
pub struct AuthState {
    pub enabled: bool,
}

/// Authentication middleware
///
/// With auth enabled the front proxy must supply the user header; the group header is
/// optional. With auth disabled a local superadmin is injected.
///
/// Injects `Principal` into request extensions.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.enabled {
        request
            .extensions_mut()
            .insert(Principal::local_superadmin());
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    let username = headers
        .get(HEADER_REMOTE_USER)
        .ok_or_else(AuthError::required)?
        .to_str()
        .map_err(|_| AuthError::invalid_header())?;
    if username.trim().is_empty() {
        return Err(AuthError::required());
    }

    let groups = match headers.get(HEADER_REMOTE_GROUPS) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::invalid_header())?),
        None => None,
    };

    let principal = Principal::from_headers(username, groups);
    tracing::trace!(user = %principal.username, groups = ?principal.groups, "Authenticated");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
