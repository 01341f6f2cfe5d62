//! Equipment repository for SQLite operations
//!
//! Report queries take a [`PredicateTree`] and render it through
//! [`crate::data::sqlite::filters`]; nothing from the request reaches the SQL text.

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::sqlite::filters::{SqlParams, SqlValue};
use crate::data::types::EquipmentRecord;
use crate::domain::reports::filters::PredicateTree;

/// Joined SELECT; user references resolve to the full name, else the username
const SELECT_EQUIPMENT: &str = r#"
    SELECT e.*,
           c.name AS category_name,
           s.name AS status_name,
           COALESCE(NULLIF(TRIM(ue.first_name || ' ' || ue.last_name), ''), ue.username) AS emp_name,
           COALESCE(NULLIF(TRIM(uc.first_name || ' ' || uc.last_name), ''), uc.username) AS created_by_name,
           COALESCE(NULLIF(TRIM(uu.first_name || ' ' || uu.last_name), ''), uu.username) AS updated_by_name,
           COALESCE(NULLIF(TRIM(ua.first_name || ' ' || ua.last_name), ''), ua.username) AS archived_by_name
    FROM equipment e
    LEFT JOIN categories c ON c.id = e.category_id
    LEFT JOIN statuses s ON s.id = e.status_id
    LEFT JOIN users ue ON ue.id = e.emp_id
    LEFT JOIN users uc ON uc.id = e.created_by_id
    LEFT JOIN users uu ON uu.id = e.updated_by_id
    LEFT JOIN users ua ON ua.id = e.archived_by_id
"#;

/// Count and summed unit price of the matching records
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportTotals {
    pub records: i64,
    pub amount: f64,
}

fn arguments<'q>(params: SqlParams) -> Result<SqliteArguments<'q>, SqliteError> {
    let mut args = SqliteArguments::default();
    for value in params.values {
        let added = match value {
            SqlValue::Integer(i) => args.add(i),
            SqlValue::Real(f) => args.add(f),
            SqlValue::Text(s) => args.add(s),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

fn where_clause(tree: &PredicateTree) -> (String, SqlParams) {
    let mut params = SqlParams::default();
    let sql = tree.to_sql(&mut params);
    (sql, params)
}

fn map_rows(rows: Vec<SqliteRow>) -> Result<Vec<EquipmentRecord>, SqliteError> {
    rows.iter()
        .map(|row| EquipmentRecord::from_row(row).map_err(SqliteError::from))
        .collect()
}

pub async fn report_totals(
    pool: &SqlitePool,
    tree: &PredicateTree,
) -> Result<ReportTotals, SqliteError> {
    let (filter, params) = where_clause(tree);

    let count_sql = format!("SELECT COUNT(*) FROM equipment e WHERE {}", filter);
    let records: i64 = sqlx::query_scalar_with(&count_sql, arguments(params.clone())?)
        .fetch_one(pool)
        .await?;

    let sum_sql = format!(
        "SELECT COALESCE(SUM(e.item_amount), 0.0) FROM equipment e WHERE {}",
        filter
    );
    let amount: f64 = sqlx::query_scalar_with(&sum_sql, arguments(params)?)
        .fetch_one(pool)
        .await?;

    Ok(ReportTotals { records, amount })
}

/// One page of matching records in id order
pub async fn list_page(
    pool: &SqlitePool,
    tree: &PredicateTree,
    limit: u32,
    offset: u64,
) -> Result<Vec<EquipmentRecord>, SqliteError> {
    let (filter, params) = where_clause(tree);
    let mut args = arguments(params)?;
    args.add(i64::from(limit)).map_err(sqlx::Error::Encode)?;
    args.add(offset as i64).map_err(sqlx::Error::Encode)?;

    let sql = format!(
        "{} WHERE {} ORDER BY e.id LIMIT ? OFFSET ?",
        SELECT_EQUIPMENT, filter
    );
    let rows = sqlx::query_with(&sql, args).fetch_all(pool).await?;

    map_rows(rows)
}

/// Every matching record in id order (print and export)
pub async fn list_all(
    pool: &SqlitePool,
    tree: &PredicateTree,
) -> Result<Vec<EquipmentRecord>, SqliteError> {
    let (filter, params) = where_clause(tree);
    let sql = format!("{} WHERE {} ORDER BY e.id", SELECT_EQUIPMENT, filter);
    let rows = sqlx::query_with(&sql, arguments(params)?)
        .fetch_all(pool)
        .await?;

    map_rows(rows)
}

pub async fn get_equipment(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<EquipmentRecord>, SqliteError> {
    let sql = format!("{} WHERE e.id = ?", SELECT_EQUIPMENT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| EquipmentRecord::from_row(&r))
        .transpose()
        .map_err(Into::into)
}
