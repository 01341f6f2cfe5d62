//! Authorization extractors for Axum handlers
//!
//! These extractors combine authentication (from middleware) with the role check
//! for the route into a single extraction step.
//!
//! # Usage
//!
//! ```no_run
//! # use weims_server::api::auth::ReportAccess;
//! # use weims_server::api::types::ApiError;
//! pub async fn list_fields(auth: ReportAccess) -> Result<(), ApiError> {
//!     // auth.principal - the caller, already checked for report access
//!     Ok(())
//! }
//! ```

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::context::{Principal, RoleFlags};
use crate::api::types::ApiError;

// ============================================================================
// Access Markers
// ============================================================================

/// Marker trait for role requirements
pub trait AccessLevel: Send + Sync + 'static {
    fn allows(roles: &RoleFlags) -> bool;
}

/// Any authenticated principal
pub struct AnyRole;
impl AccessLevel for AnyRole {
    fn allows(_roles: &RoleFlags) -> bool {
        true
    }
}

/// Admins and superadmins
pub struct ReportViewer;
impl AccessLevel for ReportViewer {
    fn allows(roles: &RoleFlags) -> bool {
        roles.can_view_reports()
    }
}

// ============================================================================
// Auth Rejection
// ============================================================================

/// Rejection type for auth extractors
pub enum AuthRejection {
    /// Authorization failed
    Auth(ApiError),
    /// Principal not available (middleware not applied)
    MissingContext,
}

impl From<ApiError> for AuthRejection {
    fn from(e: ApiError) -> Self {
        Self::Auth(e)
    }
}

impl axum::response::IntoResponse for AuthRejection {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::MissingContext => {
                ApiError::internal("Auth context not available").into_response()
            }
        }
    }
}

// ============================================================================
// Authorized
// ============================================================================

/// Authenticated principal that passed the `Level` role check
pub struct Authorized<Level: AccessLevel> {
    pub principal: Principal,
    _level: PhantomData<Level>,
}

/// Any authenticated principal
pub type Authenticated = Authorized<AnyRole>;

/// Principal allowed to view reports
pub type ReportAccess = Authorized<ReportViewer>;

impl<S, Level> FromRequestParts<S> for Authorized<Level>
where
    S: Send + Sync,
    Level: AccessLevel,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AuthRejection::MissingContext)?;

        if !Level::allows(&principal.roles) {
            tracing::debug!(user = %principal.username, "Access denied");
            return Err(AuthRejection::Auth(ApiError::forbidden(
                "FORBIDDEN",
                "You do not have permission to access this resource",
            )));
        }

        Ok(Self {
            principal,
            _level: PhantomData,
        })
    }
}
