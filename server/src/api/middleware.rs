//! HTTP middleware (CORS, 404 handler)
//!
//! Export downloads carry `Content-Disposition` and `X-Export-Warning`, which browsers
//! only expose to scripts when listed in `Access-Control-Expose-Headers`.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::types::ApiError;
use crate::core::config::is_all_interfaces;
use crate::core::constants::HEADER_EXPORT_WARNING;

/// Allowed origins configuration
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Create allowed origins from host and port configuration
    pub fn new(host: &str, port: u16) -> Self {
        let mut origins = Vec::new();
        let is_all = is_all_interfaces(host);

        let base_hosts: Vec<&str> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost", "127.0.0.1"]
        } else {
            vec![host]
        };

        for h in &base_hosts {
            origins.push(format!("http://{}:{}", h, port));
            origins.push(format!("http://{}", h));
        }

        // Allow LAN IPs when binding to all interfaces
        if is_all && let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                origins.push(format!("http://{}:{}", ip, port));
            }
        }

        Self { origins }
    }

    #[cfg(test)]
    fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// Get origins as HeaderValues for CORS
    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
        ])
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(HEADER_EXPORT_WARNING),
        ])
        .allow_credentials(true)
}

/// Unknown routes answer with the standard JSON error body
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "No route");
    ApiError::not_found(
        "ROUTE_NOT_FOUND",
        format!("No route for {} {}", req.method(), req.uri().path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_localhost() {
        let origins = AllowedOrigins::new("127.0.0.1", 5390);
        assert!(origins.is_allowed("http://localhost:5390"));
        assert!(origins.is_allowed("http://127.0.0.1:5390"));
        assert!(!origins.is_allowed("http://evil.example:5390"));
    }

    #[test]
    fn test_allowed_origins_specific_host() {
        let origins = AllowedOrigins::new("10.0.0.5", 8000);
        assert!(origins.is_allowed("http://10.0.0.5:8000"));
        assert!(!origins.is_allowed("http://localhost:8000"));
    }
}
