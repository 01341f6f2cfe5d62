//! Domain logic for equipment inventory reporting
//!
//! - `reports` - filter compilation, column projection and report export

pub mod reports;
