//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use super::auth::{AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::openapi_json;
use super::routes::reports::ReportSettings;
use super::routes::{equipment, health, reports};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Full application router with middleware applied
    pub fn router(&self) -> Router {
        let app = &self.app;
        let auth = AuthState {
            enabled: app.config.auth.enabled,
        };

        let settings = ReportSettings {
            organization: app.config.reports.organization.clone(),
            template_path: app.storage.template_path(&app.config.reports),
            default_per_page: app.config.reports.default_per_page,
        };
        let reports_routes = reports::routes(app.database.clone(), settings)
            .layer(from_fn_with_state(auth, require_auth));
        let equipment_routes =
            equipment::routes(app.database.clone()).layer(from_fn_with_state(auth, require_auth));

        Router::new()
            .route("/api/v1/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .nest("/api/v1/reports", reports_routes)
            .nest("/api/v1/equipment", equipment_routes)
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(middleware::cors(&self.allowed_origins))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let router = self.router();
        let Self { app, .. } = self;

        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "Listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(app.shutdown.wait())
        .await?;

        Ok(app)
    }
}
