//! Row types shared by the repositories and the API

mod equipment;
mod reports;

pub use equipment::EquipmentRecord;
pub use reports::{FilterOptionRow, LookupRow, ReportTemplateRow, UserRefRow};
