//! Data storage layer
//!
//! - `sqlite` - Record store: schema, migrations, report SQL rendering and repositories
//! - `types` - Row types shared by repositories and the API

pub mod sqlite;
pub mod types;

pub use sqlite::{SqliteError, SqliteService};
