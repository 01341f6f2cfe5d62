//! Reports API endpoints
//!
//! The equipment report with its exports, the field catalog and filter dropdown
//! values, and saved report templates.

pub mod catalog;
pub mod report;
pub mod templates;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use catalog::{filter_options, list_fields};
use report::equipment_report;
use templates::{create_template, delete_template, get_template, list_templates};

use crate::data::SqliteService;

/// Report-wide settings resolved at startup
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Printed in document headers and attachment names
    pub organization: String,
    /// Branded Word template
    pub template_path: PathBuf,
    pub default_per_page: u32,
}

/// Shared state for Reports API endpoints
#[derive(Clone)]
pub struct ReportsApiState {
    pub database: Arc<SqliteService>,
    pub settings: Arc<ReportSettings>,
}

/// Build Reports API routes
pub fn routes(database: Arc<SqliteService>, settings: ReportSettings) -> Router<()> {
    let state = ReportsApiState {
        database,
        settings: Arc::new(settings),
    };

    Router::new()
        .route("/equipment", get(equipment_report))
        .route("/equipment/fields", get(list_fields))
        .route("/equipment/filter-options", get(filter_options))
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/{id}", get(get_template).delete(delete_template))
        .with_state(state)
}
