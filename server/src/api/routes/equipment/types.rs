//! Equipment API response types

use serde::Serialize;
use utoipa::ToSchema;

/// One formatted field of a record
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentField {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentDetail {
    pub id: i64,
    pub item_name: String,
    /// Every catalog field in column-picker order
    pub fields: Vec<EquipmentField>,
}
