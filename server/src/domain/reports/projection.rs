//! Column projection

use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::Field;

/// Columns used when the request selects none
pub const DEFAULT_COLUMNS: [Field; 11] = [
    Field::UserImage,
    Field::ItemPropertynum,
    Field::ItemName,
    Field::ItemDesc,
    Field::PoNumber,
    Field::ItemAmount,
    Field::EndUser,
    Field::AssignedTo,
    Field::Category,
    Field::ItemPurdate,
    Field::CurrentLocation,
];

/// An output column with its header label. Unknown ids have no field and
/// use the id itself as label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedColumn {
    pub key: String,
    pub label: String,
    #[serde(skip)]
    pub field: Option<Field>,
}

impl ResolvedColumn {
    pub fn resolve(key: &str) -> Self {
        let field = Field::from_name(key);
        Self {
            key: key.to_string(),
            label: field.map(Field::label).unwrap_or(key).to_string(),
            field,
        }
    }
}

/// Ordered, duplicate-free output columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<ResolvedColumn>,
}

impl ColumnSelection {
    /// Resolve requested column ids, falling back to [`DEFAULT_COLUMNS`] when
    /// nothing usable was requested.
    pub fn resolve<S: AsRef<str>>(requested: &[S]) -> Self {
        let mut keys: Vec<&str> = requested
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();

        if keys.is_empty() {
            keys = DEFAULT_COLUMNS.iter().map(|f| f.name()).collect();
        }

        let mut columns: Vec<ResolvedColumn> = Vec::with_capacity(keys.len());
        for key in keys {
            if !columns.iter().any(|c| c.key == key) {
                columns.push(ResolvedColumn::resolve(key));
            }
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
