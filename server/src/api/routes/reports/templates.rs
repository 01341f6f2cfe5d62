//! Saved report templates of the current principal

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::ReportsApiState;
use super::types::{CreateTemplateRequest, ListTemplatesResponse};
use crate::api::auth::ReportAccess;
use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::types::ApiError;
use crate::data::sqlite::repositories;
use crate::data::types::ReportTemplateRow;

fn template_not_found(id: i64) -> ApiError {
    ApiError::not_found("NOT_FOUND", format!("Report template not found: {}", id))
}

/// List saved templates, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reports/templates",
    tag = "reports",
    responses(
        (status = 200, description = "Saved templates", body = ListTemplatesResponse),
        (status = 403, description = "Access denied")
    )
)]
pub async fn list_templates(
    State(state): State<ReportsApiState>,
    auth: ReportAccess,
) -> Result<Json<ListTemplatesResponse>, ApiError> {
    let data = repositories::list_for_owner(state.database.pool(), &auth.principal.username)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(ListTemplatesResponse { data }))
}

/// Save a template
#[utoipa::path(
    post,
    path = "/api/v1/reports/templates",
    tag = "reports",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template saved", body = ReportTemplateRow),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "A template with this name exists"),
        (status = 403, description = "Access denied")
    )
)]
pub async fn create_template(
    State(state): State<ReportsApiState>,
    auth: ReportAccess,
    ValidatedJson(req): ValidatedJson<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<ReportTemplateRow>), ApiError> {
    let template = repositories::create_template(
        state.database.pool(),
        &auth.principal.username,
        req.name.trim(),
        &req.columns,
        &req.filters,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    tracing::info!(
        target: "audit",
        action = "report_template.create",
        user = %auth.principal.username,
        template_id = template.id,
        name = %template.name,
        "Report template saved"
    );

    Ok((StatusCode::CREATED, Json(template)))
}

/// Get a template
#[utoipa::path(
    get,
    path = "/api/v1/reports/templates/{id}",
    tag = "reports",
    params(("id" = i64, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template", body = ReportTemplateRow),
        (status = 404, description = "Template not found"),
        (status = 403, description = "Access denied")
    )
)]
pub async fn get_template(
    State(state): State<ReportsApiState>,
    auth: ReportAccess,
    path: IdPath,
) -> Result<Json<ReportTemplateRow>, ApiError> {
    repositories::get_template(state.database.pool(), &auth.principal.username, path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .map(Json)
        .ok_or_else(|| template_not_found(path.id))
}

/// Delete a template
#[utoipa::path(
    delete,
    path = "/api/v1/reports/templates/{id}",
    tag = "reports",
    params(("id" = i64, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 404, description = "Template not found"),
        (status = 403, description = "Access denied")
    )
)]
pub async fn delete_template(
    State(state): State<ReportsApiState>,
    auth: ReportAccess,
    path: IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted =
        repositories::delete_template(state.database.pool(), &auth.principal.username, path.id)
            .await
            .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(template_not_found(path.id));
    }

    tracing::info!(
        target: "audit",
        action = "report_template.delete",
        user = %auth.principal.username,
        template_id = path.id,
        "Report template deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{json_body, seeded_router, send};

    #[tokio::test]
    async fn test_template_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let router = seeded_router(&dir.path().join("t.docx")).await;

        let body = json!({
            "name": " Laptops ",
            "columns": ["item_name", "category"],
            "filters": [{"column": "category", "operator": "exact", "value": "1"}]
        });
        let response = send(&router, "POST", "/templates", "admin", "admin", Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["name"], "Laptops");
        let id = created["id"].as_i64().unwrap();

        // Same name again
        let response = send(&router, "POST", "/templates", "admin", "admin", Some(body)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = send(&router, "GET", "/templates", "admin", "admin", None).await;
        let listed = json_body(response).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        // Templates are private to their owner
        let uri = format!("/templates/{}", id);
        let response = send(&router, "GET", &uri, "other", "admin", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&router, "GET", &uri, "admin", "admin", None).await;
        assert_eq!(json_body(response).await["filters"][0]["column"], "category");

        let response = send(&router, "DELETE", &uri, "admin", "admin", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&router, "DELETE", &uri, "admin", "admin", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_template_validation() {
        let dir = tempfile::tempdir().unwrap();
        let router = seeded_router(&dir.path().join("t.docx")).await;

        let response = send(
            &router,
            "POST",
            "/templates",
            "admin",
            "admin",
            Some(json!({"name": "  "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");

        let response = send(&router, "GET", "/templates/abc", "admin", "admin", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_ID");
    }
}
