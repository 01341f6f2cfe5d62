//! Saved report presets, scoped to their owner

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ReportTemplateRow;
use crate::domain::reports::filters::FilterRow;

type TemplateTuple = (i64, String, String, String, String, i64);

fn from_tuple(
    (id, owner, name, columns, filters, created_at): TemplateTuple,
) -> Result<ReportTemplateRow, SqliteError> {
    Ok(ReportTemplateRow {
        id,
        owner,
        name,
        columns: serde_json::from_str(&columns)?,
        filters: serde_json::from_str(&filters)?,
        created_at,
    })
}

pub async fn create_template(
    pool: &SqlitePool,
    owner: &str,
    name: &str,
    columns: &[String],
    filters: &[FilterRow],
) -> Result<ReportTemplateRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let columns_json = serde_json::to_string(columns)?;
    let filters_json = serde_json::to_string(filters)?;

    let result = sqlx::query(
        r#"
        INSERT INTO report_templates (owner, name, columns, filters, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (owner, name) DO NOTHING
        "#,
    )
    .bind(owner)
    .bind(name)
    .bind(&columns_json)
    .bind(&filters_json)
    .bind(now)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SqliteError::Conflict(format!(
            "A report template named '{}' already exists",
            name
        )));
    }

    Ok(ReportTemplateRow {
        id: result.last_insert_rowid(),
        owner: owner.to_string(),
        name: name.to_string(),
        columns: columns.to_vec(),
        filters: filters.to_vec(),
        created_at: now,
    })
}

/// Newest first
pub async fn list_for_owner(
    pool: &SqlitePool,
    owner: &str,
) -> Result<Vec<ReportTemplateRow>, SqliteError> {
    let rows: Vec<TemplateTuple> = sqlx::query_as(
        r#"
        SELECT id, owner, name, columns, filters, created_at
        FROM report_templates
        WHERE owner = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(from_tuple).collect()
}

pub async fn get_template(
    pool: &SqlitePool,
    owner: &str,
    id: i64,
) -> Result<Option<ReportTemplateRow>, SqliteError> {
    let row: Option<TemplateTuple> = sqlx::query_as(
        r#"
        SELECT id, owner, name, columns, filters, created_at
        FROM report_templates
        WHERE owner = ? AND id = ?
        "#,
    )
    .bind(owner)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(from_tuple).transpose()
}

/// Returns true if a template was removed
pub async fn delete_template(pool: &SqlitePool, owner: &str, id: i64) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM report_templates WHERE owner = ? AND id = ?")
        .bind(owner)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
