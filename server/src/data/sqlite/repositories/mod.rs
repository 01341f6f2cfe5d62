//! SQLite repositories
//!
//! Row types are imported from `crate::data::types`.

pub mod equipment;
pub mod lookup;
pub mod report_template;

pub use equipment::{ReportTotals, get_equipment, list_all, list_page, report_totals};
pub use lookup::{
    category_exists, distinct_values, list_categories, list_referenced_users, list_statuses,
    seed_defaults, status_exists,
};
pub use report_template::{create_template, delete_template, get_template, list_for_owner};
