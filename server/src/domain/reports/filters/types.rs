//! Filter and predicate types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::reports::catalog::{Field, FieldKind};

/// One user-specified constraint as submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterRow {
    pub column: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl FilterRow {
    pub fn new(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Zip index-aligned request arrays; extra entries in longer arrays are ignored
    pub fn zip(columns: &[String], operators: &[String], values: &[String]) -> Vec<FilterRow> {
        columns
            .iter()
            .zip(operators)
            .zip(values)
            .map(|((column, operator), value)| FilterRow::new(column, operator, value))
            .collect()
    }

    pub fn operator(&self) -> FilterOperator {
        FilterOperator::parse(&self.operator)
    }
}

/// Operator as named on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum FilterOperator {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "icontains")]
    Contains,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "gte")]
    Gte,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "isnull")]
    IsNull,
    #[serde(rename = "notnull")]
    NotNull,
    #[serde(rename = "unsupported")]
    Unsupported,
}

impl FilterOperator {
    pub fn parse(s: &str) -> Self {
        match s {
            "exact" | "equals" => Self::Exact,
            "icontains" | "contains" => Self::Contains,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "gte" => Self::Gte,
            "lte" => Self::Lte,
            "isnull" => Self::IsNull,
            "notnull" => Self::NotNull,
            _ => Self::Unsupported,
        }
    }

    pub fn is_null_check(self) -> bool {
        matches!(self, Self::IsNull | Self::NotNull)
    }

    /// Lookup for operators valid on date fields
    pub fn date_lookup(self) -> Option<Lookup> {
        match self {
            Self::Exact => Some(Lookup::Equals),
            Self::Gt => Some(Lookup::GreaterThan),
            Self::Lt => Some(Lookup::LessThan),
            Self::Gte => Some(Lookup::GreaterOrEqual),
            Self::Lte => Some(Lookup::LessOrEqual),
            _ => None,
        }
    }

    /// Operators a filter row can meaningfully use for a field kind
    pub fn supported_for(kind: FieldKind) -> &'static [FilterOperator] {
        use FilterOperator::*;
        match kind {
            FieldKind::Text => &[Exact, Contains, IsNull, NotNull],
            FieldKind::Integer | FieldKind::Decimal | FieldKind::File => {
                &[Contains, IsNull, NotNull]
            }
            FieldKind::Date | FieldKind::DateTime => &[Exact, Gt, Lt, Gte, Lte, IsNull, NotNull],
            FieldKind::Boolean | FieldKind::ForeignKey | FieldKind::UserReference => {
                &[Exact, IsNull, NotNull]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    IsNull,
    IsNotNull,
}

impl Lookup {
    /// Comparison operator for binary lookups
    pub fn sql_operator(self) -> &'static str {
        match self {
            Lookup::Equals => "=",
            Lookup::Contains => "LIKE",
            Lookup::GreaterThan => ">",
            Lookup::LessThan => "<",
            Lookup::GreaterOrEqual => ">=",
            Lookup::LessOrEqual => "<=",
            Lookup::IsNull => "IS NULL",
            Lookup::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Typed predicate operand
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    None,
    Integer(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
    /// Unix seconds, compared against the raw datetime column
    Timestamp(i64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: Field,
    pub lookup: Lookup,
    pub value: PredicateValue,
}

impl Predicate {
    pub fn new(field: Field, lookup: Lookup, value: PredicateValue) -> Self {
        Self {
            field,
            lookup,
            value,
        }
    }
}

/// Predicates on one column, OR-ed together
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub column: String,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateTree {
    All(Vec<PredicateTree>),
    Any(Vec<PredicateTree>),
    Leaf(Predicate),
}

impl PredicateTree {
    /// Matches every record
    pub fn everything() -> Self {
        PredicateTree::All(Vec::new())
    }

    /// AND across groups, OR within a group
    pub fn from_groups(groups: Vec<PredicateGroup>) -> Self {
        PredicateTree::All(
            groups
                .into_iter()
                .map(|group| {
                    let mut leaves: Vec<PredicateTree> =
                        group.predicates.into_iter().map(PredicateTree::Leaf).collect();
                    if leaves.len() == 1 {
                        leaves.remove(0)
                    } else {
                        PredicateTree::Any(leaves)
                    }
                })
                .collect(),
        )
    }

    /// AND of plain predicates (legacy form)
    pub fn all_of(predicates: Vec<Predicate>) -> Self {
        PredicateTree::All(predicates.into_iter().map(PredicateTree::Leaf).collect())
    }

    pub fn is_everything(&self) -> bool {
        matches!(self, PredicateTree::All(children) if children.is_empty())
    }

    /// Number of leaf predicates
    pub fn leaf_count(&self) -> usize {
        match self {
            PredicateTree::Leaf(_) => 1,
            PredicateTree::All(children) | PredicateTree::Any(children) => {
                children.iter().map(PredicateTree::leaf_count).sum()
            }
        }
    }
}

/// Why a filter row contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("blank column")]
    BlankColumn,

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("empty value")]
    EmptyValue,

    #[error("reference id '{0}' is not an integer")]
    MalformedReference(String),

    #[error("operator '{0}' is not supported on date fields")]
    UnsupportedDateOperator(String),

    #[error("'{0}' is not a YYYY-MM-DD date")]
    MalformedDate(String),
}
