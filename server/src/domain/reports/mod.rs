//! Equipment inventory reports
//!
//! - `catalog` - reportable fields, their kinds and labels
//! - `filters` - filter rows compiled to a predicate tree
//! - `legacy` - the fixed-field filter form
//! - `projection` - column selection
//! - `format` - cell rendering and the report table
//! - `export` - CSV, Word and PDF encoders

pub mod catalog;
pub mod export;
pub mod filters;
pub mod format;
pub mod legacy;
pub mod projection;

pub use catalog::{Field, FieldGroup, FieldKind};
pub use filters::{FilterRow, PredicateTree, compile};
pub use format::{CellValue, FieldSource, ReportTable};
pub use projection::{ColumnSelection, ResolvedColumn};
