//! Legacy report filter form
//!
//! The simple date range / status / category / assigned-to form used when no
//! advanced filter rows are submitted. Unlike the advanced rows, bad input here is a
//! validation error returned to the caller.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::catalog::Field;
use super::filters::{Lookup, Predicate, PredicateTree, PredicateValue};

/// Raw legacy form fields. Empty strings count as unset.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct LegacyFilterParams {
    /// Created on or after (YYYY-MM-DD)
    #[validate(custom(function = "validate_date"))]
    pub start_date: Option<String>,

    /// Created on or before (YYYY-MM-DD)
    #[validate(custom(function = "validate_date"))]
    pub end_date: Option<String>,

    /// Status id
    #[validate(custom(function = "validate_choice"))]
    pub status: Option<String>,

    /// Category id
    #[validate(custom(function = "validate_choice"))]
    pub category: Option<String>,

    #[validate(length(
        max = 100,
        message = "assigned_to: Ensure this value has at most 100 characters."
    ))]
    pub assigned_to: Option<String>,

    #[validate(custom(function = "validate_decimal"))]
    pub item_amount: Option<String>,
}

/// Parsed legacy form
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LegacyFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<i64>,
    pub category: Option<i64>,
    pub assigned_to: Option<String>,
    pub item_amount: Option<f64>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_choice(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|d| d.is_finite())
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_date(value).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("invalid_date")
        .with_message(Cow::Borrowed("Enter a valid date (YYYY-MM-DD).")))
}

fn validate_choice(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_choice(value).is_some() {
        return Ok(());
    }
    Err(invalid_choice())
}

fn validate_decimal(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_decimal(value).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("invalid_decimal")
        .with_message(Cow::Borrowed("item_amount: Enter a number.")))
}

/// Error for a status or category id that does not name an existing row
pub fn invalid_choice() -> ValidationError {
    ValidationError::new("invalid_choice").with_message(Cow::Borrowed(
        "Select a valid choice. That choice is not one of the available choices.",
    ))
}

impl LegacyFilterParams {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        [
            &self.start_date,
            &self.end_date,
            &self.status,
            &self.category,
            &self.assigned_to,
            &self.item_amount,
        ]
        .into_iter()
        .all(|v| present(v).is_none())
    }

    /// Parse the form. Call after [`Validate::validate`] succeeded; values that
    /// fail to parse are treated as unset.
    pub fn to_filter(&self) -> LegacyFilter {
        LegacyFilter {
            start_date: present(&self.start_date).and_then(parse_date),
            end_date: present(&self.end_date).and_then(parse_date),
            status: present(&self.status).and_then(parse_choice),
            category: present(&self.category).and_then(parse_choice),
            assigned_to: present(&self.assigned_to).map(str::to_string),
            item_amount: present(&self.item_amount).and_then(parse_decimal),
        }
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

impl LegacyFilter {
    /// Conjunction of the set fields
    pub fn to_tree(&self) -> PredicateTree {
        let mut predicates = Vec::new();

        if let Some(date) = self.start_date {
            predicates.push(Predicate::new(
                Field::CreatedAt,
                Lookup::GreaterOrEqual,
                PredicateValue::Timestamp(midnight_utc(date)),
            ));
        }
        if let Some(date) = self.end_date {
            predicates.push(Predicate::new(
                Field::CreatedAt,
                Lookup::LessOrEqual,
                PredicateValue::Timestamp(midnight_utc(date)),
            ));
        }
        if let Some(id) = self.status {
            predicates.push(Predicate::new(
                Field::Status,
                Lookup::Equals,
                PredicateValue::Integer(id),
            ));
        }
        if let Some(id) = self.category {
            predicates.push(Predicate::new(
                Field::Category,
                Lookup::Equals,
                PredicateValue::Integer(id),
            ));
        }
        if let Some(text) = &self.assigned_to {
            predicates.push(Predicate::new(
                Field::AssignedTo,
                Lookup::Contains,
                PredicateValue::Text(text.clone()),
            ));
        }
        if let Some(amount) = self.item_amount {
            predicates.push(Predicate::new(
                Field::ItemAmount,
                Lookup::Equals,
                PredicateValue::Decimal(amount),
            ));
        }

        PredicateTree::all_of(predicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LegacyFilterParams {
        LegacyFilterParams::default()
    }

    #[test]
    fn test_empty_form_matches_everything() {
        let p = LegacyFilterParams {
            status: Some(String::new()),
            ..params()
        };
        assert!(p.validate().is_ok());
        assert!(p.is_empty());
        assert!(p.to_filter().to_tree().is_everything());
    }

    #[test]
    fn test_bad_amount_is_validation_error() {
        let p = LegacyFilterParams {
            item_amount: Some("abc".into()),
            ..params()
        };
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("item_amount"));
    }

    #[test]
    fn test_bad_date_and_choice() {
        let p = LegacyFilterParams {
            start_date: Some("2024-13-01".into()),
            category: Some("laptops".into()),
            ..params()
        };
        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("start_date"));
        assert!(fields.contains_key("category"));
    }

    #[test]
    fn test_assigned_to_too_long() {
        let p = LegacyFilterParams {
            assigned_to: Some("x".repeat(101)),
            ..params()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_tree_from_full_form() {
        let p = LegacyFilterParams {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            status: Some("2".into()),
            category: Some(" 3 ".into()),
            assigned_to: Some("Juan".into()),
            item_amount: Some("1500.50".into()),
        };
        assert!(p.validate().is_ok());

        let filter = p.to_filter();
        assert_eq!(filter.category, Some(3));
        assert_eq!(filter.item_amount, Some(1500.5));

        let tree = filter.to_tree();
        assert_eq!(tree.leaf_count(), 6);
        let PredicateTree::All(children) = tree else {
            panic!("expected All");
        };
        assert_eq!(
            children[0],
            PredicateTree::Leaf(Predicate::new(
                Field::CreatedAt,
                Lookup::GreaterOrEqual,
                PredicateValue::Timestamp(1_704_067_200),
            ))
        );
    }
}
