//! Equipment report and exports

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use sqlx::SqlitePool;
use validator::{Validate, ValidationErrors};

use super::ReportsApiState;
use super::types::{ReportColumn, ReportQuery, ReportResponse};
use crate::api::auth::ReportAccess;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, PaginationMeta, resolve_per_page};
use crate::core::constants::HEADER_EXPORT_WARNING;
use crate::data::sqlite::repositories;
use crate::domain::reports::export::{
    ExportFormat, ExportOptions, ExportRequest, ReportContext, render_with_fallback,
};
use crate::domain::reports::filters::{PredicateTree, compile};
use crate::domain::reports::format::format_currency;
use crate::domain::reports::legacy::{LegacyFilterParams, invalid_choice};
use crate::domain::reports::{ColumnSelection, ReportTable};

/// Equipment report
///
/// Filters come from the advanced rows when any `filter_column[]` is sent, else from
/// the legacy form. `export` selects the on-screen table or a CSV, Word or PDF download.
#[utoipa::path(
    get,
    path = "/api/v1/reports/equipment",
    tag = "reports",
    params(
        ("filter_column[]" = Option<Vec<String>>, Query, description = "Filter field, one per row"),
        ("filter_operator[]" = Option<Vec<String>>, Query, description = "Filter operator, one per row"),
        ("filter_value[]" = Option<Vec<String>>, Query, description = "Filter value, one per row"),
        ("columns" = Option<Vec<String>>, Query, description = "Output columns, repeated"),
        ("export" = Option<String>, Query, description = "table, csv, word or pdf"),
        ("orientation" = Option<String>, Query, description = "portrait or landscape"),
        ("table_style" = Option<String>, Query, description = "table_grid, table_professional, table_colorful or table_minimal"),
        ("font_size" = Option<u8>, Query, description = "Document font size (6-24)"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Rows per page (10, 25, 50, 100)"),
        ("print_all" = Option<bool>, Query, description = "Return every row without pagination"),
        ("start_date" = Option<String>, Query, description = "Legacy: created on or after (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Legacy: created on or before (YYYY-MM-DD)"),
        ("status" = Option<i64>, Query, description = "Legacy: status id"),
        ("category" = Option<i64>, Query, description = "Legacy: category id"),
        ("assigned_to" = Option<String>, Query, description = "Legacy: assigned-to contains"),
        ("item_amount" = Option<String>, Query, description = "Legacy: exact amount")
    ),
    responses(
        (status = 200, description = "Report table, or a document attachment when exporting", body = ReportResponse),
        (status = 400, description = "Invalid legacy filter form"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Access denied")
    )
)]
pub async fn equipment_report(
    State(state): State<ReportsApiState>,
    auth: ReportAccess,
    ValidatedQuery(query): ValidatedQuery<ReportQuery>,
) -> Result<Response, ApiError> {
    let pool = state.database.pool();

    let tree = if query.is_advanced() {
        compile(&query.filter_rows())
    } else {
        legacy_tree(pool, &query.legacy()).await?
    };

    let totals = repositories::report_totals(pool, &tree)
        .await
        .map_err(ApiError::from_sqlite)?;
    let selection = ColumnSelection::resolve(&query.columns);
    let format = ExportFormat::parse(query.export.as_deref());

    tracing::debug!(
        user = %auth.principal.username,
        advanced = query.is_advanced(),
        filtered = !tree.is_everything(),
        predicates = tree.leaf_count(),
        records = totals.records,
        format = format.as_str(),
        "Equipment report"
    );

    if format != ExportFormat::Table {
        let records = repositories::list_all(pool, &tree)
            .await
            .map_err(ApiError::from_sqlite)?;
        let table = ReportTable::build(&selection, &records);
        return export(&state, &auth, format, &query, &table, totals);
    }

    let (records, pagination) = if query.print_all() {
        let records = repositories::list_all(pool, &tree)
            .await
            .map_err(ApiError::from_sqlite)?;
        (records, None)
    } else {
        let per_page = resolve_per_page(
            query.per_page.as_deref(),
            state.settings.default_per_page,
        );
        let meta = PaginationMeta::clamp(
            query.page.as_deref(),
            per_page,
            totals.records.max(0) as u64,
        );
        let records = repositories::list_page(pool, &tree, per_page, meta.offset())
            .await
            .map_err(ApiError::from_sqlite)?;
        (records, Some(meta))
    };

    let table = ReportTable::build(&selection, &records);
    let columns = selection
        .columns()
        .iter()
        .map(|c| ReportColumn {
            key: c.key.clone(),
            label: c.label.clone(),
        })
        .collect();

    Ok(Json(ReportResponse {
        columns,
        rows: table.rows,
        pagination,
        total_records: totals.records,
        total_amount: totals.amount,
        total_amount_display: format_currency(totals.amount),
    })
    .into_response())
}

/// Validate the legacy form, including that the status and category ids exist
async fn legacy_tree(
    pool: &SqlitePool,
    params: &LegacyFilterParams,
) -> Result<PredicateTree, ApiError> {
    if params.is_empty() {
        return Ok(PredicateTree::everything());
    }
    params.validate().map_err(|e| ApiError::validation(&e))?;
    let filter = params.to_filter();

    let mut errors = ValidationErrors::new();
    if let Some(id) = filter.status {
        let exists = repositories::status_exists(pool, id)
            .await
            .map_err(ApiError::from_sqlite)?;
        if !exists {
            errors.add("status", invalid_choice());
        }
    }
    if let Some(id) = filter.category {
        let exists = repositories::category_exists(pool, id)
            .await
            .map_err(ApiError::from_sqlite)?;
        if !exists {
            errors.add("category", invalid_choice());
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(&errors));
    }

    Ok(filter.to_tree())
}

fn export(
    state: &ReportsApiState,
    auth: &ReportAccess,
    format: ExportFormat,
    query: &ReportQuery,
    table: &ReportTable,
    totals: repositories::ReportTotals,
) -> Result<Response, ApiError> {
    let settings = &state.settings;
    let context = ReportContext::new(
        settings.organization.clone(),
        chrono::Local::now().naive_local(),
    )
    .with_totals(totals.records.max(0) as usize, totals.amount);
    let options = ExportOptions::from_params(
        query.orientation.as_deref(),
        query.table_style.as_deref(),
        query.font_size.as_deref(),
    );

    let request = ExportRequest {
        table,
        context: &context,
        options,
        template_path: &settings.template_path,
    };
    let rendered = render_with_fallback(format, &request).map_err(ApiError::from_export)?;

    tracing::info!(
        target: "audit",
        action = "report.export",
        user = %auth.principal.username,
        requested = format.as_str(),
        delivered = rendered.format.as_str(),
        records = table.row_count(),
        columns = table.column_count(),
        "Equipment report exported"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(rendered.content_type),
    );
    let disposition = format!("attachment; filename=\"{}\"", rendered.filename);
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| ApiError::internal("Invalid attachment name"))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    if let Some(warning) = &rendered.warning {
        match HeaderValue::from_str(warning) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(HEADER_EXPORT_WARNING), value);
            }
            Err(_) => tracing::debug!("Export warning is not a valid header value"),
        }
    }

    Ok((headers, rendered.body).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{json_body, raw_body, seeded_router, send};

    const ADMIN: (&str, &str) = ("admin", "admin");

    async fn get(uri: &str) -> axum::response::Response {
        let dir = tempfile::tempdir().unwrap();
        let router = seeded_router(&dir.path().join("missing.docx")).await;
        send(&router, "GET", uri, ADMIN.0, ADMIN.1, None).await
    }

    #[tokio::test]
    async fn test_default_columns_and_totals() {
        let response = get("/equipment").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let keys: Vec<&str> = body["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["key"].as_str().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "user_image",
                "item_propertynum",
                "item_name",
                "item_desc",
                "po_number",
                "item_amount",
                "end_user",
                "assigned_to",
                "category",
                "item_purdate",
                "current_location",
            ]
        );
        assert_eq!(body["total_records"], 4);
        assert_eq!(body["total_amount_display"], "PHP 3,350.75");
        assert_eq!(body["pagination"]["total_pages"], 1);
        assert_eq!(body["rows"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_advanced_rows_bypass_legacy_form() {
        // The legacy status value would be a validation error on its own
        let response = get(
            "/equipment?filter_column%5B%5D=category&filter_operator%5B%5D=exact&filter_value%5B%5D=1\
             &filter_column%5B%5D=status&filter_operator%5B%5D=exact&filter_value%5B%5D=\
             &status=abc&columns=item_name&columns=category&columns=item_name",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["total_records"], 2);
        assert_eq!(body["columns"].as_array().unwrap().len(), 2);
        assert_eq!(body["rows"][0][0], "Laptop Pro");
        assert_eq!(body["rows"][0][1], "Laptop");
        assert_eq!(body["rows"][1][0], "Laptop Air");
    }

    #[tokio::test]
    async fn test_advanced_malformed_amount_is_silent() {
        let response = get(
            "/equipment?filter_column%5B%5D=item_amount&filter_operator%5B%5D=exact&filter_value%5B%5D=abc",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total_records"], 0);
    }

    #[tokio::test]
    async fn test_stale_filter_column_is_dropped() {
        let response = get(
            "/equipment?filter_column%5B%5D=category&filter_operator%5B%5D=exact&filter_value%5B%5D=1\
             &filter_column%5B%5D=warranty&filter_operator%5B%5D=icontains&filter_value%5B%5D=2y",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total_records"], 2);
    }

    #[tokio::test]
    async fn test_legacy_form_validation() {
        let response = get("/equipment?item_amount=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "item_amount: Enter a number.");

        let response = get("/equipment?category=99").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("category: Select a valid choice"));
    }

    #[tokio::test]
    async fn test_legacy_category_filter() {
        let response = get("/equipment?category=1&columns=item_name").await;
        let body = json_body(response).await;
        assert_eq!(body["total_records"], 2);
        assert_eq!(body["total_amount"], 2700.25);
    }

    #[tokio::test]
    async fn test_pagination_clamps_and_print_all() {
        let body = json_body(get("/equipment?per_page=10&page=7").await).await;
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["per_page"], 10);

        let body = json_body(get("/equipment?per_page=33").await).await;
        assert_eq!(body["pagination"]["per_page"], 25);

        let body = json_body(get("/equipment?print_all=true").await).await;
        assert!(body["pagination"].is_null());
        assert_eq!(body["rows"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_csv_export() {
        let response = get("/equipment?export=csv&columns=item_name&columns=item_amount").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"equipment_report.csv\""
        );
        assert!(response.headers().get("x-export-warning").is_none());

        let text = String::from_utf8(raw_body(response).await).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Item Name,Amount"));
        assert_eq!(lines.next(), Some("Laptop Pro,\"PHP 1,500.25\""));
    }

    #[tokio::test]
    async fn test_word_without_template_falls_back_to_csv() {
        let response = get("/equipment?export=word").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/csv; charset=utf-8"
        );
        let warning = response.headers()["x-export-warning"].to_str().unwrap();
        assert!(warning.starts_with("Word document generation failed"));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_pdf_export_attachment() {
        let response = get("/equipment?export=pdf&orientation=landscape").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"WESMAARRDEC_Equipment_Report_landscape.pdf\""
        );
        assert!(raw_body(response).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_requires_report_role() {
        let dir = tempfile::tempdir().unwrap();
        let router = seeded_router(&dir.path().join("missing.docx")).await;

        let response = send(&router, "GET", "/equipment", "jdoe", "client", None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&router, "GET", "/equipment", "boss", "Superuser", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
