//! Filter row compilation
//!
//! Each [`FilterRow`] compiles on its own into either a typed [`Predicate`] or a
//! [`SkipReason`]. Skipped rows are logged and contribute nothing; a malformed
//! value or a column the catalog does not know is never a request error on this
//! path.

use chrono::NaiveDate;

use super::types::{
    FilterOperator, FilterRow, Lookup, Predicate, PredicateGroup, PredicateTree, PredicateValue,
    SkipReason,
};
use crate::domain::reports::catalog::{Field, FieldKind};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Compile one row into a predicate
pub fn compile_row(row: &FilterRow) -> Result<Predicate, SkipReason> {
    if row.column.is_empty() {
        return Err(SkipReason::BlankColumn);
    }

    let field = Field::from_name(&row.column)
        .ok_or_else(|| SkipReason::UnknownColumn(row.column.clone()))?;
    let operator = row.operator();

    // Null checks ignore the value entirely
    if operator.is_null_check() {
        let lookup = if operator == FilterOperator::IsNull {
            Lookup::IsNull
        } else {
            Lookup::IsNotNull
        };
        return Ok(Predicate {
            field,
            lookup,
            value: PredicateValue::None,
        });
    }

    if row.value.is_empty() {
        return Err(SkipReason::EmptyValue);
    }

    let predicate = match field.kind() {
        FieldKind::ForeignKey | FieldKind::UserReference => {
            let id = row
                .value
                .trim()
                .parse::<i64>()
                .map_err(|_| SkipReason::MalformedReference(row.value.clone()))?;
            Predicate::new(field, Lookup::Equals, PredicateValue::Integer(id))
        }
        FieldKind::Date | FieldKind::DateTime => {
            let lookup = operator
                .date_lookup()
                .ok_or_else(|| SkipReason::UnsupportedDateOperator(row.operator.clone()))?;
            let date = NaiveDate::parse_from_str(&row.value, DATE_FORMAT)
                .map_err(|_| SkipReason::MalformedDate(row.value.clone()))?;
            Predicate::new(field, lookup, PredicateValue::Date(date))
        }
        FieldKind::Boolean => Predicate::new(
            field,
            Lookup::Equals,
            PredicateValue::Boolean(is_truthy(&row.value)),
        ),
        FieldKind::Text if operator == FilterOperator::Exact => Predicate::new(
            field,
            Lookup::Equals,
            PredicateValue::Text(row.value.clone()),
        ),
        // File paths are only ever substring-matched
        FieldKind::Text | FieldKind::File | FieldKind::Integer | FieldKind::Decimal => {
            contains(field, &row.value)
        }
    };

    Ok(predicate)
}

/// Fold rows into per-column groups, in first-seen column order
pub fn group_rows(rows: &[FilterRow]) -> Vec<PredicateGroup> {
    rows.iter().fold(Vec::new(), |mut groups, row| {
        match compile_row(row) {
            Ok(predicate) => match groups
                .iter_mut()
                .find(|g: &&mut PredicateGroup| g.column == row.column)
            {
                Some(group) => group.predicates.push(predicate),
                None => groups.push(PredicateGroup {
                    column: row.column.clone(),
                    predicates: vec![predicate],
                }),
            },
            Err(reason) => {
                tracing::debug!(
                    column = %row.column,
                    operator = %row.operator,
                    %reason,
                    "Skipping filter row"
                );
            }
        }
        groups
    })
}

/// Compile rows into a predicate tree
pub fn compile(rows: &[FilterRow]) -> PredicateTree {
    PredicateTree::from_groups(group_rows(rows))
}

fn contains(field: Field, value: &str) -> Predicate {
    Predicate::new(field, Lookup::Contains, PredicateValue::Text(value.to_string()))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(column: &str, operator: &str, value: &str) -> FilterRow {
        FilterRow::new(column, operator, value)
    }

    #[test]
    fn test_empty_value_is_skipped() {
        for op in ["exact", "icontains", "gt", "bogus"] {
            assert_eq!(
                compile_row(&row("item_name", op, "")),
                Err(SkipReason::EmptyValue)
            );
        }
    }

    #[test]
    fn test_blank_column_is_skipped() {
        assert_eq!(
            compile_row(&row("", "exact", "x")),
            Err(SkipReason::BlankColumn)
        );
    }

    #[test]
    fn test_null_checks_ignore_value() {
        let p = compile_row(&row("emp", "isnull", "")).unwrap();
        assert_eq!(p.lookup, Lookup::IsNull);
        assert_eq!(p.value, PredicateValue::None);

        let p = compile_row(&row("date_archived", "notnull", "whatever")).unwrap();
        assert_eq!(p.lookup, Lookup::IsNotNull);
        assert_eq!(p.field, Field::DateArchived);
    }

    #[test]
    fn test_reference_forces_equals_on_id() {
        let p = compile_row(&row("category", "icontains", "3")).unwrap();
        assert_eq!(p, Predicate::new(Field::Category, Lookup::Equals, PredicateValue::Integer(3)));

        let p = compile_row(&row("created_by", "gt", " 12 ")).unwrap();
        assert_eq!(p.value, PredicateValue::Integer(12));
    }

    #[test]
    fn test_reference_malformed_id_is_skipped() {
        assert_eq!(
            compile_row(&row("status", "exact", "Active")),
            Err(SkipReason::MalformedReference("Active".into()))
        );
    }

    #[test]
    fn test_date_operators() {
        let p = compile_row(&row("item_purdate", "gte", "2024-01-15")).unwrap();
        assert_eq!(p.lookup, Lookup::GreaterOrEqual);
        assert_eq!(
            p.value,
            PredicateValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );

        assert_eq!(
            compile_row(&row("created_at", "icontains", "2024-01-15")),
            Err(SkipReason::UnsupportedDateOperator("icontains".into()))
        );
        assert_eq!(
            compile_row(&row("created_at", "lt", "15/01/2024")),
            Err(SkipReason::MalformedDate("15/01/2024".into()))
        );
    }

    #[test]
    fn test_boolean_truthiness() {
        for v in ["1", "true", "YES", "On"] {
            let p = compile_row(&row("is_returned", "icontains", v)).unwrap();
            assert_eq!(p.lookup, Lookup::Equals);
            assert_eq!(p.value, PredicateValue::Boolean(true), "{}", v);
        }
        for v in ["0", "false", "nope"] {
            let p = compile_row(&row("is_archived", "exact", v)).unwrap();
            assert_eq!(p.value, PredicateValue::Boolean(false), "{}", v);
        }
    }

    #[test]
    fn test_text_operator_defaults_to_contains() {
        let p = compile_row(&row("item_name", "exact", "Laptop")).unwrap();
        assert_eq!(p.lookup, Lookup::Equals);

        let p = compile_row(&row("item_name", "gt", "Laptop")).unwrap();
        assert_eq!(p.lookup, Lookup::Contains);
        assert_eq!(p.value, PredicateValue::Text("Laptop".into()));
    }

    #[test]
    fn test_numeric_falls_back_to_contains() {
        let p = compile_row(&row("item_amount", "exact", "abc")).unwrap();
        assert_eq!(p.field, Field::ItemAmount);
        assert_eq!(p.lookup, Lookup::Contains);
    }

    #[test]
    fn test_file_fields_always_contain() {
        for (column, op) in [
            ("user_image", "exact"),
            ("return_document", "gt"),
            ("order_receipt", "icontains"),
        ] {
            let p = compile_row(&row(column, op, "scan.pdf")).unwrap();
            assert_eq!(p.lookup, Lookup::Contains, "{}", column);
            assert_eq!(p.value, PredicateValue::Text("scan.pdf".into()));
        }
    }

    #[test]
    fn test_unknown_column_is_skipped() {
        assert_eq!(
            compile_row(&row("warranty", "icontains", "2y")),
            Err(SkipReason::UnknownColumn("warranty".into()))
        );
        assert_eq!(
            compile_row(&row("warranty", "isnull", "")),
            Err(SkipReason::UnknownColumn("warranty".into()))
        );

        let with_stale = vec![row("category", "exact", "1"), row("warranty", "icontains", "2y")];
        let without = vec![row("category", "exact", "1")];
        assert_eq!(compile(&with_stale), compile(&without));
    }

    #[test]
    fn test_category_with_empty_status_only_keeps_category() {
        let rows = vec![row("category", "exact", "3"), row("status", "exact", "")];
        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].column, "category");
        assert_eq!(compile(&rows).leaf_count(), 1);
    }

    #[test]
    fn test_malformed_reference_equals_omission() {
        let with_bad = vec![row("category", "exact", "x"), row("item_name", "icontains", "pc")];
        let without = vec![row("item_name", "icontains", "pc")];
        assert_eq!(compile(&with_bad), compile(&without));
    }

    #[test]
    fn test_same_column_values_are_or_grouped() {
        let rows = vec![
            row("status", "exact", "1"),
            row("category", "exact", "2"),
            row("status", "exact", "3"),
        ];
        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].column, "status");
        assert_eq!(groups[0].predicates.len(), 2);

        let PredicateTree::All(children) = compile(&rows) else {
            panic!("expected All");
        };
        assert!(matches!(&children[0], PredicateTree::Any(c) if c.len() == 2));
        assert!(matches!(&children[1], PredicateTree::Leaf(_)));
    }

    #[test]
    fn test_all_rows_skipped_yields_everything() {
        let rows = vec![row("status", "exact", ""), row("category", "exact", "abc")];
        assert!(compile(&rows).is_everything());
    }
}
