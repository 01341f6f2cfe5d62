//! API route handlers

pub mod equipment;
pub mod health;
pub mod reports;
