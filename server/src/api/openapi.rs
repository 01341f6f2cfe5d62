//! OpenAPI specification

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{equipment, health, reports};
use crate::api::types::PaginationMeta;
use crate::data::types::{FilterOptionRow, LookupRow, ReportTemplateRow, UserRefRow};
use crate::domain::reports::catalog::{FieldGroup, FieldKind};
use crate::domain::reports::filters::{FilterOperator, FilterRow};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WEIMS API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Equipment inventory reports"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "reports", description = "Equipment reports, exports and saved templates"),
        (name = "equipment", description = "Equipment records")
    ),
    paths(
        // Health
        health::health,
        // Reports
        reports::report::equipment_report,
        reports::catalog::list_fields,
        reports::catalog::filter_options,
        reports::templates::list_templates,
        reports::templates::create_template,
        reports::templates::get_template,
        reports::templates::delete_template,
        // Equipment
        equipment::get_equipment,
    ),
    components(schemas(
        // API types
        PaginationMeta,
        // Health
        health::HealthResponse,
        // Report types
        reports::types::ReportColumn,
        reports::types::ReportResponse,
        reports::types::FieldInfo,
        reports::types::FieldsResponse,
        reports::types::FieldOptions,
        reports::types::FilterOptionsResponse,
        reports::types::CreateTemplateRequest,
        reports::types::ListTemplatesResponse,
        FieldKind,
        FieldGroup,
        FilterOperator,
        FilterRow,
        LookupRow,
        UserRefRow,
        FilterOptionRow,
        ReportTemplateRow,
        // Equipment types
        equipment::types::EquipmentField,
        equipment::types::EquipmentDetail,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_report_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/v1/reports/equipment"));
        assert!(paths.iter().any(|p| *p == "/api/v1/reports/templates/{id}"));
        assert!(paths.iter().any(|p| *p == "/api/v1/equipment/{id}"));
    }
}
