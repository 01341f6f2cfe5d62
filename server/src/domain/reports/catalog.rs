//! Reportable field catalog
//!
//! Every equipment field that can be filtered on or projected into a report is a
//! variant of [`Field`]. The match in [`Field::spec`] is exhaustive, so adding a
//! field without a kind, label or column is a compile error.

use serde::Serialize;
use utoipa::ToSchema;

/// Value kind of a catalog field. Drives filter coercion and cell formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
    DateTime,
    Boolean,
    ForeignKey,
    UserReference,
    /// Stored upload path
    File,
}

/// Column picker grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    General,
    Assignment,
    Financial,
    Status,
    Return,
    Archive,
    Other,
}

/// Static catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
    pub group: FieldGroup,
    /// Column expression against the `equipment e` alias
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    UserImage,
    ItemPropertynum,
    ItemName,
    ItemDesc,
    AdditionalInfo,
    AssignedTo,
    EndUser,
    Emp,
    Location,
    CurrentLocation,
    ProjectName,
    ItemPurdate,
    PoNumber,
    FundSource,
    Supplier,
    ItemAmount,
    Units,
    TotalValue,
    Category,
    Status,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
    IsReturned,
    ReturnDocument,
    ReturnRemarks,
    ReturnCondition,
    ReturnType,
    ReturnedBy,
    ReceivedBy,
    IsArchived,
    DateArchived,
    ArchivedBy,
    OrderReceipt,
}

impl Field {
    /// All fields in column-picker order
    pub const ALL: [Field; 36] = [
        Field::ItemName,
        Field::ItemPropertynum,
        Field::ItemDesc,
        Field::AdditionalInfo,
        Field::UserImage,
        Field::AssignedTo,
        Field::EndUser,
        Field::Emp,
        Field::Location,
        Field::CurrentLocation,
        Field::ProjectName,
        Field::ItemPurdate,
        Field::PoNumber,
        Field::FundSource,
        Field::Supplier,
        Field::ItemAmount,
        Field::Units,
        Field::TotalValue,
        Field::Category,
        Field::Status,
        Field::CreatedBy,
        Field::UpdatedBy,
        Field::CreatedAt,
        Field::UpdatedAt,
        Field::IsReturned,
        Field::ReturnDocument,
        Field::ReturnRemarks,
        Field::ReturnCondition,
        Field::ReturnType,
        Field::ReturnedBy,
        Field::ReceivedBy,
        Field::IsArchived,
        Field::DateArchived,
        Field::ArchivedBy,
        Field::OrderReceipt,
        Field::Id,
    ];

    pub fn spec(self) -> &'static FieldSpec {
        use FieldGroup as G;
        use FieldKind as K;

        match self {
            Field::Id => &FieldSpec {
                name: "id",
                kind: K::Integer,
                label: "ID",
                group: G::Other,
                column: "e.id",
            },
            Field::UserImage => &FieldSpec {
                name: "user_image",
                kind: K::File,
                label: "Equipment Image",
                group: G::General,
                column: "e.user_image",
            },
            Field::ItemPropertynum => &FieldSpec {
                name: "item_propertynum",
                kind: K::Text,
                label: "Property Number",
                group: G::General,
                column: "e.item_propertynum",
            },
            Field::ItemName => &FieldSpec {
                name: "item_name",
                kind: K::Text,
                label: "Item Name",
                group: G::General,
                column: "e.item_name",
            },
            Field::ItemDesc => &FieldSpec {
                name: "item_desc",
                kind: K::Text,
                label: "Item Description",
                group: G::General,
                column: "e.item_desc",
            },
            Field::AdditionalInfo => &FieldSpec {
                name: "additional_info",
                kind: K::Text,
                label: "Additional Info",
                group: G::General,
                column: "e.additional_info",
            },
            Field::AssignedTo => &FieldSpec {
                name: "assigned_to",
                kind: K::Text,
                label: "Assigned To",
                group: G::Assignment,
                column: "e.assigned_to",
            },
            Field::EndUser => &FieldSpec {
                name: "end_user",
                kind: K::Text,
                label: "End User",
                group: G::Assignment,
                column: "e.end_user",
            },
            Field::Emp => &FieldSpec {
                name: "emp",
                kind: K::UserReference,
                label: "Employee",
                group: G::Assignment,
                column: "e.emp_id",
            },
            Field::Location => &FieldSpec {
                name: "location",
                kind: K::Text,
                label: "Location",
                group: G::Assignment,
                column: "e.location",
            },
            Field::CurrentLocation => &FieldSpec {
                name: "current_location",
                kind: K::Text,
                label: "Current Location",
                group: G::Assignment,
                column: "e.current_location",
            },
            Field::ProjectName => &FieldSpec {
                name: "project_name",
                kind: K::Text,
                label: "Project Name",
                group: G::Assignment,
                column: "e.project_name",
            },
            Field::ItemPurdate => &FieldSpec {
                name: "item_purdate",
                kind: K::Date,
                label: "Purchase Date",
                group: G::Financial,
                column: "e.item_purdate",
            },
            Field::PoNumber => &FieldSpec {
                name: "po_number",
                kind: K::Text,
                label: "PO Number",
                group: G::Financial,
                column: "e.po_number",
            },
            Field::FundSource => &FieldSpec {
                name: "fund_source",
                kind: K::Text,
                label: "Fund Source",
                group: G::Financial,
                column: "e.fund_source",
            },
            Field::Supplier => &FieldSpec {
                name: "supplier",
                kind: K::Text,
                label: "Supplier",
                group: G::Financial,
                column: "e.supplier",
            },
            Field::ItemAmount => &FieldSpec {
                name: "item_amount",
                kind: K::Decimal,
                label: "Amount",
                group: G::Financial,
                column: "e.item_amount",
            },
            Field::Units => &FieldSpec {
                name: "units",
                kind: K::Integer,
                label: "Units/Quantity",
                group: G::Financial,
                column: "e.units",
            },
            Field::TotalValue => &FieldSpec {
                name: "total_value",
                kind: K::Decimal,
                label: "Total Value",
                group: G::Financial,
                column: "e.total_value",
            },
            Field::Category => &FieldSpec {
                name: "category",
                kind: K::ForeignKey,
                label: "Category",
                group: G::Status,
                column: "e.category_id",
            },
            Field::Status => &FieldSpec {
                name: "status",
                kind: K::ForeignKey,
                label: "Status",
                group: G::Status,
                column: "e.status_id",
            },
            Field::CreatedBy => &FieldSpec {
                name: "created_by",
                kind: K::UserReference,
                label: "Created By",
                group: G::Status,
                column: "e.created_by_id",
            },
            Field::UpdatedBy => &FieldSpec {
                name: "updated_by",
                kind: K::UserReference,
                label: "Updated By",
                group: G::Status,
                column: "e.updated_by_id",
            },
            Field::CreatedAt => &FieldSpec {
                name: "created_at",
                kind: K::DateTime,
                label: "Created At",
                group: G::Status,
                column: "e.created_at",
            },
            Field::UpdatedAt => &FieldSpec {
                name: "updated_at",
                kind: K::DateTime,
                label: "Updated At",
                group: G::Status,
                column: "e.updated_at",
            },
            Field::IsReturned => &FieldSpec {
                name: "is_returned",
                kind: K::Boolean,
                label: "Is Returned",
                group: G::Return,
                column: "e.is_returned",
            },
            Field::ReturnDocument => &FieldSpec {
                name: "return_document",
                kind: K::File,
                label: "Return Document",
                group: G::Return,
                column: "e.return_document",
            },
            Field::ReturnRemarks => &FieldSpec {
                name: "return_remarks",
                kind: K::Text,
                label: "Return Remarks",
                group: G::Return,
                column: "e.return_remarks",
            },
            Field::ReturnCondition => &FieldSpec {
                name: "return_condition",
                kind: K::Text,
                label: "Condition Upon Return",
                group: G::Return,
                column: "e.return_condition",
            },
            Field::ReturnType => &FieldSpec {
                name: "return_type",
                kind: K::Text,
                label: "Return Type",
                group: G::Return,
                column: "e.return_type",
            },
            Field::ReturnedBy => &FieldSpec {
                name: "returned_by",
                kind: K::Text,
                label: "Returned By",
                group: G::Return,
                column: "e.returned_by",
            },
            Field::ReceivedBy => &FieldSpec {
                name: "received_by",
                kind: K::Text,
                label: "Received By",
                group: G::Return,
                column: "e.received_by",
            },
            Field::IsArchived => &FieldSpec {
                name: "is_archived",
                kind: K::Boolean,
                label: "Is Archived",
                group: G::Archive,
                column: "e.is_archived",
            },
            Field::DateArchived => &FieldSpec {
                name: "date_archived",
                kind: K::DateTime,
                label: "Date Archived",
                group: G::Archive,
                column: "e.date_archived",
            },
            Field::ArchivedBy => &FieldSpec {
                name: "archived_by",
                kind: K::UserReference,
                label: "Archived By",
                group: G::Archive,
                column: "e.archived_by_id",
            },
            Field::OrderReceipt => &FieldSpec {
                name: "order_receipt",
                kind: K::File,
                label: "Order Receipt",
                group: G::Other,
                column: "e.order_receipt",
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn kind(self) -> FieldKind {
        self.spec().kind
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn group(self) -> FieldGroup {
        self.spec().group
    }

    pub fn column(self) -> &'static str {
        self.spec().column
    }

    /// Expression used for substring matching. Numbers match on their
    /// rendered text, decimals with two places.
    pub fn text_expr(self) -> String {
        match self.kind() {
            FieldKind::Decimal => format!("printf('%.2f', {})", self.column()),
            FieldKind::Integer => format!("CAST({} AS TEXT)", self.column()),
            _ => self.column().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_all_fields_listed_once() {
        let names: HashSet<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Field::ALL.len());
    }

    #[test]
    fn test_from_name_round_trips_every_field() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("no_such_field"), None);
        assert_eq!(Field::from_name(""), None);
    }

    #[test]
    fn test_kinds_match_inventory_model() {
        assert_eq!(Field::Category.kind(), FieldKind::ForeignKey);
        assert_eq!(Field::Status.kind(), FieldKind::ForeignKey);
        for f in [
            Field::Emp,
            Field::CreatedBy,
            Field::UpdatedBy,
            Field::ArchivedBy,
        ] {
            assert_eq!(f.kind(), FieldKind::UserReference);
        }
        assert_eq!(Field::ItemPurdate.kind(), FieldKind::Date);
        assert_eq!(Field::CreatedAt.kind(), FieldKind::DateTime);
        assert_eq!(Field::DateArchived.kind(), FieldKind::DateTime);
        assert_eq!(Field::IsReturned.kind(), FieldKind::Boolean);
        assert_eq!(Field::ItemAmount.kind(), FieldKind::Decimal);
        assert_eq!(Field::Id.kind(), FieldKind::Integer);
        for f in [Field::UserImage, Field::ReturnDocument, Field::OrderReceipt] {
            assert_eq!(f.kind(), FieldKind::File);
        }
    }

    #[test]
    fn test_reference_columns_target_ids() {
        for field in Field::ALL {
            if matches!(field.kind(), FieldKind::ForeignKey | FieldKind::UserReference) {
                assert!(field.column().ends_with("_id"), "{}", field.name());
            }
        }
    }

    #[test]
    fn test_text_expr() {
        assert_eq!(
            Field::ItemAmount.text_expr(),
            "printf('%.2f', e.item_amount)"
        );
        assert_eq!(Field::Units.text_expr(), "CAST(e.units AS TEXT)");
        assert_eq!(Field::ItemName.text_expr(), "e.item_name");
    }
}
