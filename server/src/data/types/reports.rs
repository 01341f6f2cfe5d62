//! Lookup and saved-report rows

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::reports::filters::FilterRow;

/// Category or status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupRow {
    pub id: i64,
    pub name: String,
}

/// User referenced by at least one equipment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserRefRow {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

/// Distinct value of a text column with its usage count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterOptionRow {
    pub value: String,
    pub count: i64,
}

/// Saved report preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportTemplateRow {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub columns: Vec<String>,
    pub filters: Vec<FilterRow>,
    pub created_at: i64,
}
