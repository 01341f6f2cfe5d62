//! Authentication module

mod context;
mod extractors;
pub mod middleware;

pub use context::{Principal, RoleFlags};
pub use extractors::{
    AccessLevel, AnyRole, AuthRejection, Authenticated, Authorized, ReportAccess, ReportViewer,
};
pub use middleware::{AuthError, AuthState, require_auth};
