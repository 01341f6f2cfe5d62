//! Equipment record endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use types::{EquipmentDetail, EquipmentField};

use crate::api::auth::Authenticated;
use crate::api::extractors::IdPath;
use crate::api::types::ApiError;
use crate::data::SqliteService;
use crate::data::sqlite::repositories;
use crate::domain::reports::{Field, FieldSource};
use crate::domain::reports::format::format_cell;

/// Shared state for Equipment API endpoints
#[derive(Clone)]
pub struct EquipmentApiState {
    pub database: Arc<SqliteService>,
}

/// Build Equipment API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = EquipmentApiState { database };

    Router::new()
        .route("/{id}", get(get_equipment))
        .with_state(state)
}

/// Get one equipment record with every catalog field formatted
#[utoipa::path(
    get,
    path = "/api/v1/equipment/{id}",
    tag = "equipment",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment record", body = EquipmentDetail),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<EquipmentApiState>,
    auth: Authenticated,
    path: IdPath,
) -> Result<Json<EquipmentDetail>, ApiError> {
    let record = repositories::get_equipment(state.database.pool(), path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("NOT_FOUND", format!("Equipment not found: {}", path.id))
        })?;

    tracing::debug!(user = %auth.principal.username, id = record.id, "Equipment detail");

    let fields = Field::ALL
        .iter()
        .map(|&field| EquipmentField {
            name: field.name(),
            label: field.label(),
            value: format_cell(&record.value(field)),
        })
        .collect();

    Ok(Json(EquipmentDetail {
        id: record.id,
        item_name: record.item_name,
        fields,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use tower::ServiceExt;

    use super::*;
    use crate::api::auth::{AuthState, require_auth};
    use crate::data::sqlite::repositories::equipment::test_support::{
        seed_inventory, setup_test_pool,
    };

    async fn router(auth_enabled: bool) -> Router<()> {
        let pool = setup_test_pool().await;
        seed_inventory(&pool).await;
        routes(Arc::new(SqliteService::from_pool(pool))).layer(from_fn_with_state(
            AuthState {
                enabled: auth_enabled,
            },
            require_auth,
        ))
    }

    async fn get(router: Router<()>, uri: &str, user: Option<&str>) -> axum::response::Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-remote-user", user);
        }
        router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_detail_formats_every_field() {
        // Any principal may read a record, even without groups
        let response = get(router(true).await, "/4", Some("jdoe")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["item_name"], "Chair");

        let fields = body["fields"].as_array().unwrap();
        assert_eq!(fields.len(), Field::ALL.len());
        let value = |name: &str| {
            fields
                .iter()
                .find(|f| f["name"] == name)
                .map(|f| f["value"].as_str().unwrap().to_string())
                .unwrap()
        };
        assert_eq!(value("item_amount"), "PHP 150.50");
        assert_eq!(value("category"), "N/A");
        assert_eq!(value("emp"), "Juan Dela Cruz");
        assert_eq!(value("is_returned"), "No");
        assert_eq!(value("item_purdate"), "2024-03-05");
    }

    #[tokio::test]
    async fn test_detail_errors() {
        let response = get(router(false).await, "/99", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get(router(false).await, "/0", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(router(true).await, "/1", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
