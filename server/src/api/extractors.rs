//! Path and validation extractors for API routes
//!
//! ## HTTP Caching Strategy
//!
//! | Endpoint Type           | Cache-Control          |
//! |-------------------------|------------------------|
//! | Report and exports      | -                      |
//! | Filter options          | `private, max-age=30`  |
//! | Resource APIs           | -                      |

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::{Query, QueryRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Validated numeric record id from the `{id}` path segment.
///
/// Returns a 400 Bad Request for non-numeric or non-positive ids.
#[derive(Debug)]
pub struct IdPath {
    pub id: i64,
}

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self { id }),
            _ => Err(ValidationRejection::InvalidId),
        }
    }
}

/// Validation rejection with structured error response
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Record id is not a positive integer
    InvalidId,
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                "PATH_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::InvalidId => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                "Invalid id: must be a positive integer".to_string(),
            ),
            Self::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                "QUERY_PARSE_ERROR",
                rejection.to_string(),
            ),
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format_validation_errors(&errors),
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// One `field: message` entry per failed field, sorted by field name
pub(crate) fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match e.message.as_ref() {
                Some(m) if m.starts_with(&format!("{}:", field)) => m.to_string(),
                Some(m) => format!("{}: {}", field, m),
                None => format!("{}: validation failed", field),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters (repeated keys collect into `Vec` fields) and
/// validates them using the `validator` crate.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

/// JSON body extractor with automatic validation.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reports::legacy::LegacyFilterParams;

    #[test]
    fn test_format_validation_errors_prefixes_fields() {
        let params = LegacyFilterParams {
            start_date: Some("03/05/2024".into()),
            item_amount: Some("abc".into()),
            ..Default::default()
        };
        let errors = params.validate().unwrap_err();
        let message = format_validation_errors(&errors);
        assert_eq!(
            message,
            "item_amount: Enter a number.; start_date: Enter a valid date (YYYY-MM-DD)."
        );
    }
}
