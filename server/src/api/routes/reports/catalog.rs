//! Field catalog and filter dropdown values

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::IntoResponse;
use futures::future::try_join_all;

use super::ReportsApiState;
use super::types::{FieldInfo, FieldOptions, FieldsResponse, FilterOptionsResponse};
use crate::api::auth::ReportAccess;
use crate::api::types::ApiError;
use crate::data::sqlite::repositories;
use crate::domain::reports::Field;
use crate::domain::reports::filters::FilterOperator;
use crate::domain::reports::projection::DEFAULT_COLUMNS;

/// Text fields offered as dropdowns of their existing values
const DROPDOWN_FIELDS: [Field; 11] = [
    Field::EndUser,
    Field::AssignedTo,
    Field::ProjectName,
    Field::Location,
    Field::CurrentLocation,
    Field::FundSource,
    Field::Supplier,
    Field::ReturnCondition,
    Field::ReturnType,
    Field::ReturnedBy,
    Field::ReceivedBy,
];

/// List reportable fields
#[utoipa::path(
    get,
    path = "/api/v1/reports/equipment/fields",
    tag = "reports",
    responses(
        (status = 200, description = "Field catalog", body = FieldsResponse),
        (status = 403, description = "Access denied")
    )
)]
pub async fn list_fields(_auth: ReportAccess) -> Json<FieldsResponse> {
    let fields = Field::ALL
        .iter()
        .map(|&field| FieldInfo {
            name: field.name(),
            label: field.label(),
            kind: field.kind(),
            group: field.group(),
            operators: FilterOperator::supported_for(field.kind()).to_vec(),
        })
        .collect();

    Json(FieldsResponse {
        fields,
        default_columns: DEFAULT_COLUMNS.iter().map(|f| f.name()).collect(),
    })
}

/// Values for the filter dropdowns
#[utoipa::path(
    get,
    path = "/api/v1/reports/equipment/filter-options",
    tag = "reports",
    responses(
        (status = 200, description = "Categories, statuses, users and distinct text values", body = FilterOptionsResponse),
        (status = 403, description = "Access denied")
    )
)]
pub async fn filter_options(
    State(state): State<ReportsApiState>,
    _auth: ReportAccess,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.database.pool();

    let (categories, statuses, users) = tokio::try_join!(
        repositories::list_categories(pool),
        repositories::list_statuses(pool),
        repositories::list_referenced_users(pool),
    )
    .map_err(ApiError::from_sqlite)?;

    let values = try_join_all(DROPDOWN_FIELDS.iter().map(|&field| async move {
        repositories::distinct_values(pool, field)
            .await
            .map(|options| FieldOptions {
                field: field.name(),
                label: field.label(),
                options,
            })
    }))
    .await
    .map_err(ApiError::from_sqlite)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=30"),
    );

    Ok((
        headers,
        Json(FilterOptionsResponse {
            categories,
            statuses,
            users,
            values,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{json_body, seeded_router, send};

    #[tokio::test]
    async fn test_fields_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let router = seeded_router(&dir.path().join("t.docx")).await;

        let response = send(&router, "GET", "/equipment/fields", "admin", "admin", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let fields = body["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 36);
        assert_eq!(fields[0]["name"], "item_name");
        assert_eq!(body["default_columns"].as_array().unwrap().len(), 11);

        let category = fields.iter().find(|f| f["name"] == "category").unwrap();
        assert_eq!(category["kind"], "foreign_key");
        assert!(
            category["operators"]
                .as_array()
                .unwrap()
                .iter()
                .any(|op| op == "exact")
        );
    }

    #[tokio::test]
    async fn test_filter_options_cached_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let router = seeded_router(&dir.path().join("t.docx")).await;

        let response = send(
            &router,
            "GET",
            "/equipment/filter-options",
            "admin",
            "secretariat",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["cache-control"],
            "private, max-age=30"
        );

        let body = json_body(response).await;
        assert_eq!(body["categories"].as_array().unwrap().len(), 2);
        assert_eq!(body["statuses"][0]["name"], "Active");
        assert_eq!(body["users"].as_array().unwrap().len(), 2);

        let values = body["values"].as_array().unwrap();
        assert_eq!(values.len(), 11);
        let end_user = values.iter().find(|v| v["field"] == "end_user").unwrap();
        assert_eq!(end_user["options"][1]["value"], "ICT Unit");
        assert_eq!(end_user["options"][1]["count"], 2);
    }
}
