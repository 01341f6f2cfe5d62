//! SQLite schema definitions
//!
//! Initial schema with all tables. Datetimes are unix seconds (UTC), the purchase
//! date is `YYYY-MM-DD` text.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Lookups
-- =============================================================================
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE CHECK(length(name) >= 1 AND length(name) <= 100)
);

CREATE TABLE IF NOT EXISTS statuses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE CHECK(length(name) >= 1 AND length(name) <= 100)
);

-- =============================================================================
-- 2. Users (referenced by equipment; identities come from the front proxy)
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE CHECK(length(username) >= 1 AND length(username) <= 150),
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT ''
);

-- =============================================================================
-- 3. Equipment
-- =============================================================================
CREATE TABLE IF NOT EXISTS equipment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_image TEXT,
    item_propertynum TEXT,
    item_name TEXT NOT NULL CHECK(length(item_name) >= 1),
    item_desc TEXT,
    additional_info TEXT,
    item_purdate TEXT CHECK(item_purdate IS NULL OR item_purdate GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]'),
    po_number TEXT,
    fund_source TEXT,
    supplier TEXT,
    units INTEGER NOT NULL DEFAULT 1,
    item_amount REAL NOT NULL DEFAULT 0,
    total_value REAL,
    project_name TEXT,
    assigned_to TEXT,
    end_user TEXT,
    location TEXT,
    current_location TEXT,
    category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    status_id INTEGER REFERENCES statuses(id) ON DELETE SET NULL,
    emp_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_by_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    updated_by_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    order_receipt TEXT,
    is_returned INTEGER NOT NULL DEFAULT 0,
    return_document TEXT,
    return_remarks TEXT,
    return_condition TEXT,
    return_type TEXT,
    returned_by TEXT,
    received_by TEXT,
    is_archived INTEGER NOT NULL DEFAULT 0,
    date_archived INTEGER,
    archived_by_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_equipment_created_at ON equipment(created_at);
CREATE INDEX IF NOT EXISTS idx_equipment_category ON equipment(category_id);
CREATE INDEX IF NOT EXISTS idx_equipment_status ON equipment(status_id);

-- =============================================================================
-- 4. Saved report presets
-- =============================================================================
CREATE TABLE IF NOT EXISTS report_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    columns TEXT NOT NULL DEFAULT '[]',
    filters TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    UNIQUE(owner, name)
);

CREATE INDEX IF NOT EXISTS idx_report_templates_owner ON report_templates(owner, created_at DESC);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn test_schema_applies_twice() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "categories",
                "equipment",
                "report_templates",
                "schema_migrations",
                "schema_version",
                "statuses",
                "users"
            ]
        );
    }

    #[tokio::test]
    async fn test_purchase_date_format_enforced() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();

        let bad = sqlx::query(
            "INSERT INTO equipment (item_name, item_purdate, created_at, updated_at) VALUES ('x', '05/03/2024', 0, 0)",
        )
        .execute(&pool)
        .await;
        assert!(bad.is_err());
    }
}
