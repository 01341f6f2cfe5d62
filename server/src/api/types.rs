//! Shared API types
//!
//! Common types used across all API endpoints: error handling and pagination.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::format_validation_errors;
use crate::core::constants::{DEFAULT_PER_PAGE, PER_PAGE_CHOICES};

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Unauthorized { code: String, message: String },
    Forbidden { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Form validation failure, one message per field
    pub fn validation(errors: &validator::ValidationErrors) -> Self {
        Self::bad_request("VALIDATION_ERROR", format_validation_errors(errors))
    }

    pub fn from_sqlite(e: crate::data::sqlite::SqliteError) -> Self {
        if let crate::data::sqlite::SqliteError::Conflict(message) = e {
            return Self::conflict("CONFLICT", message);
        }
        tracing::error!(error = %e, "SQLite error");
        Self::Internal {
            message: "Database operation failed".to_string(),
        }
    }

    pub fn from_export(e: crate::domain::reports::export::ExportError) -> Self {
        tracing::error!(error = %e, "Export error");
        Self::Internal {
            message: "Report export failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", code, message)
            }
            Self::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, "forbidden", code, message)
            }
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Page size from the request; anything outside the accepted choices means the default
pub fn resolve_per_page(requested: Option<&str>, default: u32) -> u32 {
    let default = if PER_PAGE_CHOICES.contains(&default) {
        default
    } else {
        DEFAULT_PER_PAGE
    };
    requested
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| PER_PAGE_CHOICES.contains(n))
        .unwrap_or(default)
}

/// Pagination metadata in response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationMeta {
    /// Clamp the requested page into `1..=total_pages`. Non-numeric pages mean 1,
    /// pages past the end mean the last page.
    pub fn clamp(requested: Option<&str>, per_page: u32, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(per_page as u64).max(1);
        let page = requested
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|p| p.clamp(1, total_pages as i64) as u64)
            .unwrap_or(1);
        Self {
            page: page as u32,
            per_page,
            total_items,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Row offset of the first record on this page
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}
