//! Equipment record as read from the store

use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::domain::reports::catalog::Field;
use crate::domain::reports::format::{CellValue, FieldSource};

/// One equipment row joined with the display names of its references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentRecord {
    pub id: i64,
    pub user_image: Option<String>,
    pub item_propertynum: Option<String>,
    pub item_name: String,
    pub item_desc: Option<String>,
    pub additional_info: Option<String>,
    pub item_purdate: Option<NaiveDate>,
    pub po_number: Option<String>,
    pub fund_source: Option<String>,
    pub supplier: Option<String>,
    pub units: i64,
    pub item_amount: f64,
    pub total_value: Option<f64>,
    pub project_name: Option<String>,
    pub assigned_to: Option<String>,
    pub end_user: Option<String>,
    pub location: Option<String>,
    pub current_location: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
    pub emp_id: Option<i64>,
    pub emp_name: Option<String>,
    pub created_by_id: Option<i64>,
    pub created_by_name: Option<String>,
    pub updated_by_id: Option<i64>,
    pub updated_by_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub order_receipt: Option<String>,
    pub is_returned: bool,
    pub return_document: Option<String>,
    pub return_remarks: Option<String>,
    pub return_condition: Option<String>,
    pub return_type: Option<String>,
    pub returned_by: Option<String>,
    pub received_by: Option<String>,
    pub is_archived: bool,
    pub date_archived: Option<i64>,
    pub archived_by_id: Option<i64>,
    pub archived_by_name: Option<String>,
}

impl EquipmentRecord {
    /// Map a row of the repository's joined SELECT
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let purdate: Option<String> = row.try_get("item_purdate")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_image: row.try_get("user_image")?,
            item_propertynum: row.try_get("item_propertynum")?,
            item_name: row.try_get("item_name")?,
            item_desc: row.try_get("item_desc")?,
            additional_info: row.try_get("additional_info")?,
            item_purdate: purdate.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            po_number: row.try_get("po_number")?,
            fund_source: row.try_get("fund_source")?,
            supplier: row.try_get("supplier")?,
            units: row.try_get("units")?,
            item_amount: row.try_get("item_amount")?,
            total_value: row.try_get("total_value")?,
            project_name: row.try_get("project_name")?,
            assigned_to: row.try_get("assigned_to")?,
            end_user: row.try_get("end_user")?,
            location: row.try_get("location")?,
            current_location: row.try_get("current_location")?,
            category_id: row.try_get("category_id")?,
            category_name: row.try_get("category_name")?,
            status_id: row.try_get("status_id")?,
            status_name: row.try_get("status_name")?,
            emp_id: row.try_get("emp_id")?,
            emp_name: row.try_get("emp_name")?,
            created_by_id: row.try_get("created_by_id")?,
            created_by_name: row.try_get("created_by_name")?,
            updated_by_id: row.try_get("updated_by_id")?,
            updated_by_name: row.try_get("updated_by_name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            order_receipt: row.try_get("order_receipt")?,
            is_returned: row.try_get("is_returned")?,
            return_document: row.try_get("return_document")?,
            return_remarks: row.try_get("return_remarks")?,
            return_condition: row.try_get("return_condition")?,
            return_type: row.try_get("return_type")?,
            returned_by: row.try_get("returned_by")?,
            received_by: row.try_get("received_by")?,
            is_archived: row.try_get("is_archived")?,
            date_archived: row.try_get("date_archived")?,
            archived_by_id: row.try_get("archived_by_id")?,
            archived_by_name: row.try_get("archived_by_name")?,
        })
    }
}

impl FieldSource for EquipmentRecord {
    fn value(&self, field: Field) -> CellValue {
        let text = |v: &Option<String>| CellValue::Text(v.clone());
        match field {
            Field::Id => CellValue::Integer(Some(self.id)),
            Field::UserImage => text(&self.user_image),
            Field::ItemPropertynum => text(&self.item_propertynum),
            Field::ItemName => CellValue::Text(Some(self.item_name.clone())),
            Field::ItemDesc => text(&self.item_desc),
            Field::AdditionalInfo => text(&self.additional_info),
            Field::AssignedTo => text(&self.assigned_to),
            Field::EndUser => text(&self.end_user),
            Field::Emp => CellValue::Reference(self.emp_name.clone()),
            Field::Location => text(&self.location),
            Field::CurrentLocation => text(&self.current_location),
            Field::ProjectName => text(&self.project_name),
            Field::ItemPurdate => CellValue::Date(self.item_purdate),
            Field::PoNumber => text(&self.po_number),
            Field::FundSource => text(&self.fund_source),
            Field::Supplier => text(&self.supplier),
            Field::ItemAmount => CellValue::Decimal(Some(self.item_amount)),
            Field::Units => CellValue::Integer(Some(self.units)),
            Field::TotalValue => CellValue::Decimal(self.total_value),
            Field::Category => CellValue::Reference(self.category_name.clone()),
            Field::Status => CellValue::Reference(self.status_name.clone()),
            Field::CreatedBy => CellValue::Reference(self.created_by_name.clone()),
            Field::UpdatedBy => CellValue::Reference(self.updated_by_name.clone()),
            Field::CreatedAt => CellValue::DateTime(Some(self.created_at)),
            Field::UpdatedAt => CellValue::DateTime(Some(self.updated_at)),
            Field::IsReturned => CellValue::Boolean(self.is_returned),
            Field::ReturnDocument => text(&self.return_document),
            Field::ReturnRemarks => text(&self.return_remarks),
            Field::ReturnCondition => text(&self.return_condition),
            Field::ReturnType => text(&self.return_type),
            Field::ReturnedBy => text(&self.returned_by),
            Field::ReceivedBy => text(&self.received_by),
            Field::IsArchived => CellValue::Boolean(self.is_archived),
            Field::DateArchived => CellValue::DateTime(self.date_archived),
            Field::ArchivedBy => CellValue::Reference(self.archived_by_name.clone()),
            Field::OrderReceipt => text(&self.order_receipt),
        }
    }
}
