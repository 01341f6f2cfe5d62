//! Report filter compiler
//!
//! Turns submitted `(column, operator, value)` rows into a [`PredicateTree`]:
//! predicates on the same column are OR-ed, columns are AND-ed. Rows that cannot
//! be compiled are skipped, never reported as errors.
//!
//! ```
//! use weims_server::domain::reports::filters::{FilterRow, compile};
//!
//! let rows = vec![
//!     FilterRow::new("category", "exact", "3"),
//!     FilterRow::new("status", "exact", ""),
//! ];
//! assert_eq!(compile(&rows).leaf_count(), 1);
//! ```

mod compiler;
mod types;

pub use compiler::{compile, compile_row, group_rows};
pub use types::{
    FilterOperator, FilterRow, Lookup, Predicate, PredicateGroup, PredicateTree, PredicateValue,
    SkipReason,
};
