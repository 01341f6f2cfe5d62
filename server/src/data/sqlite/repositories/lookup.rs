//! Category, status and user lookups for filter dropdowns

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{FilterOptionRow, LookupRow, UserRefRow};
use crate::domain::reports::catalog::{Field, FieldKind};

/// Categories inserted by `weims system seed`
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Appliances",
    "Audio Equipment",
    "Camera Equipment",
    "Computer Hardware",
    "Computer Peripheral",
    "Desktop Computer",
    "Display Equipments",
    "Furniture",
    "Laptop",
    "Mobile Devices",
    "Monitor",
    "Networking Device",
    "Office Equipment",
    "Other",
    "Printer",
    "Storage Devices",
    "UPS",
    "Vehicle",
];

/// Statuses inserted by `weims system seed`
pub const DEFAULT_STATUSES: &[&str] = &["Active", "Maintenance", "Damaged", "Lost", "Stored"];

pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<LookupRow>, SqliteError> {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| LookupRow { id, name })
        .collect())
}

pub async fn list_statuses(pool: &SqlitePool) -> Result<Vec<LookupRow>, SqliteError> {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM statuses ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| LookupRow { id, name })
        .collect())
}

pub async fn category_exists(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn status_exists(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM statuses WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Users referenced by any equipment user-reference column
pub async fn list_referenced_users(pool: &SqlitePool) -> Result<Vec<UserRefRow>, SqliteError> {
    let rows: Vec<(i64, String, String)> = sqlx::query_as(
        r#"
        SELECT u.id, u.username,
               COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username)
        FROM users u
        WHERE u.id IN (
            SELECT emp_id FROM equipment
            UNION SELECT created_by_id FROM equipment
            UNION SELECT updated_by_id FROM equipment
            UNION SELECT archived_by_id FROM equipment
        )
        ORDER BY u.username
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, username, display_name)| UserRefRow {
            id,
            username,
            display_name,
        })
        .collect())
}

/// Non-blank distinct values of a text field with usage counts
pub async fn distinct_values(
    pool: &SqlitePool,
    field: Field,
) -> Result<Vec<FilterOptionRow>, SqliteError> {
    if field.kind() != FieldKind::Text {
        return Ok(Vec::new());
    }

    let column = field.column();
    let sql = format!(
        "SELECT {col}, COUNT(*) FROM equipment e WHERE {col} IS NOT NULL AND TRIM({col}) <> '' GROUP BY {col} ORDER BY {col}",
        col = column
    );
    let rows: Vec<(String, i64)> = sqlx::query_as(&sql).fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(value, count)| FilterOptionRow { value, count })
        .collect())
}

/// Insert default categories and statuses. Returns how many rows were new.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for name in DEFAULT_CATEGORIES {
        inserted += sqlx::query("INSERT INTO categories (name) VALUES (?) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    for name in DEFAULT_STATUSES {
        inserted += sqlx::query("INSERT INTO statuses (name) VALUES (?) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
