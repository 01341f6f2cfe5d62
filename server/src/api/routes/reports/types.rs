//! Request and response types for the reports API

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::types::PaginationMeta;
use crate::data::types::{FilterOptionRow, LookupRow, ReportTemplateRow, UserRefRow};
use crate::domain::reports::catalog::{FieldGroup, FieldKind};
use crate::domain::reports::filters::{FilterOperator, FilterRow};
use crate::domain::reports::legacy::LegacyFilterParams;

// ============================================================================
// Report
// ============================================================================

/// Query parameters for the equipment report.
///
/// Filter rows arrive as three index-aligned arrays. When at least one
/// `filter_column[]` is present the legacy form fields are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReportQuery {
    #[serde(rename = "filter_column[]", default)]
    #[validate(length(max = 100))]
    pub filter_column: Vec<String>,

    #[serde(rename = "filter_operator[]", default)]
    #[validate(length(max = 100))]
    pub filter_operator: Vec<String>,

    #[serde(rename = "filter_value[]", default)]
    #[validate(length(max = 100))]
    pub filter_value: Vec<String>,

    /// Output columns, repeated (`columns=item_name&columns=category`)
    #[serde(default)]
    #[validate(length(max = 100))]
    pub columns: Vec<String>,

    /// `table` (default), `csv`, `word` or `pdf`
    pub export: Option<String>,
    /// `portrait` or `landscape`
    pub orientation: Option<String>,
    /// `table_grid`, `table_professional`, `table_colorful` or `table_minimal`
    pub table_style: Option<String>,
    /// 6 to 24
    pub font_size: Option<String>,

    pub page: Option<String>,
    /// One of 10, 25, 50, 100
    pub per_page: Option<String>,
    /// Return every row without pagination
    pub print_all: Option<String>,

    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub item_amount: Option<String>,
}

impl ReportQuery {
    /// Advanced rows take over as soon as one filter column is submitted, even a blank one
    pub fn is_advanced(&self) -> bool {
        !self.filter_column.is_empty()
    }

    pub fn filter_rows(&self) -> Vec<FilterRow> {
        FilterRow::zip(&self.filter_column, &self.filter_operator, &self.filter_value)
    }

    pub fn legacy(&self) -> LegacyFilterParams {
        LegacyFilterParams {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            status: self.status.clone(),
            category: self.category.clone(),
            assigned_to: self.assigned_to.clone(),
            item_amount: self.item_amount.clone(),
        }
    }

    pub fn print_all(&self) -> bool {
        matches!(
            self.print_all
                .as_deref()
                .map(|s| s.trim().to_ascii_lowercase())
                .as_deref(),
            Some("true" | "1" | "yes" | "on")
        )
    }
}

/// Output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportColumn {
    pub key: String,
    pub label: String,
}

/// On-screen report
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub columns: Vec<ReportColumn>,
    /// Formatted cells, aligned with `columns`
    pub rows: Vec<Vec<String>>,
    /// Absent when `print_all` was requested
    pub pagination: Option<PaginationMeta>,
    pub total_records: i64,
    pub total_amount: f64,
    /// `total_amount` formatted as currency
    pub total_amount_display: String,
}

// ============================================================================
// Catalog
// ============================================================================

/// One reportable field
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub group: FieldGroup,
    /// Operators that make sense for this field's kind
    pub operators: Vec<FilterOperator>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldsResponse {
    pub fields: Vec<FieldInfo>,
    /// Columns used when a report names none
    pub default_columns: Vec<&'static str>,
}

/// Distinct values of one dropdown text field
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldOptions {
    pub field: &'static str,
    pub label: &'static str,
    pub options: Vec<FilterOptionRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FilterOptionsResponse {
    pub categories: Vec<LookupRow>,
    pub statuses: Vec<LookupRow>,
    pub users: Vec<UserRefRow>,
    pub values: Vec<FieldOptions>,
}

// ============================================================================
// Saved templates
// ============================================================================

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field may not be blank.")));
    }
    Ok(())
}

/// Save the current column choice and filter rows under a name
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub columns: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub filters: Vec<FilterRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListTemplatesResponse {
    pub data: Vec<ReportTemplateRow>,
}
