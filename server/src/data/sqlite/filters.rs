//! SQL generation for report predicates
//!
//! Renders a [`PredicateTree`] into a WHERE fragment with `?` placeholders against the
//! `equipment e` alias. Column text only ever comes from the static field catalog.

use crate::domain::reports::catalog::{Field, FieldKind};
use crate::domain::reports::filters::{Lookup, Predicate, PredicateTree, PredicateValue};
use crate::utils::sql::contains_pattern;

/// Bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Positional parameters collected while rendering
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    fn push(&mut self, value: SqlValue) {
        self.values.push(value);
    }
}

impl PredicateTree {
    /// Generate the WHERE fragment for this tree
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            PredicateTree::Leaf(predicate) => predicate.to_sql(params),
            PredicateTree::All(children) if children.is_empty() => "1 = 1".to_string(),
            PredicateTree::Any(children) if children.is_empty() => "1 = 0".to_string(),
            PredicateTree::All(children) => join(children, " AND ", params),
            PredicateTree::Any(children) => join(children, " OR ", params),
        }
    }
}

fn join(children: &[PredicateTree], op: &str, params: &mut SqlParams) -> String {
    let parts: Vec<String> = children.iter().map(|c| c.to_sql(params)).collect();
    format!("({})", parts.join(op))
}

impl Predicate {
    /// Generate the SQL clause for a single predicate
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        let field = self.field;

        match self.lookup {
            Lookup::IsNull | Lookup::IsNotNull => {
                format!("{} {}", field.column(), self.lookup.sql_operator())
            }
            Lookup::Contains => {
                let needle = match &self.value {
                    PredicateValue::Text(s) => s.clone(),
                    other => plain_text(other),
                };
                params.push(SqlValue::Text(contains_pattern(&needle)));
                format!("{} LIKE ? ESCAPE '\\'", field.text_expr())
            }
            lookup => comparison(field, lookup, &self.value, params),
        }
    }
}

fn comparison(
    field: Field,
    lookup: Lookup,
    value: &PredicateValue,
    params: &mut SqlParams,
) -> String {
    let op = lookup.sql_operator();
    let column = field.column();

    match value {
        PredicateValue::Date(date) => {
            params.push(SqlValue::Text(date.format("%Y-%m-%d").to_string()));
            if field.kind() == FieldKind::DateTime {
                format!("date({}, 'unixepoch') {} ?", column, op)
            } else {
                format!("{} {} ?", column, op)
            }
        }
        PredicateValue::Decimal(d) => {
            params.push(SqlValue::Real(*d));
            format!("ROUND({}, 2) {} ROUND(?, 2)", column, op)
        }
        PredicateValue::Integer(i) | PredicateValue::Timestamp(i) => {
            params.push(SqlValue::Integer(*i));
            format!("{} {} ?", column, op)
        }
        PredicateValue::Boolean(b) => {
            params.push(SqlValue::Integer(i64::from(*b)));
            format!("{} {} ?", column, op)
        }
        PredicateValue::Text(s) => {
            params.push(SqlValue::Text(s.clone()));
            format!("{} {} ?", column, op)
        }
        PredicateValue::None => format!("{} IS NULL", column),
    }
}

fn plain_text(value: &PredicateValue) -> String {
    match value {
        PredicateValue::None => String::new(),
        PredicateValue::Integer(i) | PredicateValue::Timestamp(i) => i.to_string(),
        PredicateValue::Decimal(d) => format!("{:.2}", d),
        PredicateValue::Text(s) => s.clone(),
        PredicateValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        PredicateValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::reports::filters::{FilterRow, compile};

    fn render(tree: &PredicateTree) -> (String, Vec<SqlValue>) {
        let mut params = SqlParams::default();
        let sql = tree.to_sql(&mut params);
        (sql, params.values)
    }

    #[test]
    fn test_everything_renders_true() {
        assert_eq!(render(&PredicateTree::everything()).0, "1 = 1");
        assert_eq!(render(&PredicateTree::Any(vec![])).0, "1 = 0");
    }

    #[test]
    fn test_grouped_rows_render_and_or() {
        let tree = compile(&[
            FilterRow::new("status", "exact", "1"),
            FilterRow::new("status", "exact", "2"),
            FilterRow::new("item_name", "icontains", "50%_off"),
        ]);
        let (sql, values) = render(&tree);
        assert_eq!(
            sql,
            "((e.status_id = ? OR e.status_id = ?) AND e.item_name LIKE ? ESCAPE '\\')"
        );
        assert_eq!(
            values,
            vec![
                SqlValue::Integer(1),
                SqlValue::Integer(2),
                SqlValue::Text("%50\\%\\_off%".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_column_adds_no_constraint() {
        let tree = compile(&[FilterRow::new("password; DROP TABLE", "exact", "x")]);
        let (sql, values) = render(&tree);
        assert_eq!(sql, "1 = 1");
        assert!(values.is_empty());
    }

    #[test]
    fn test_datetime_compares_calendar_date() {
        let p = Predicate::new(
            Field::CreatedAt,
            Lookup::GreaterOrEqual,
            PredicateValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "date(e.created_at, 'unixepoch') >= ?");
        assert_eq!(params.values, vec![SqlValue::Text("2024-03-01".into())]);

        let p = Predicate::new(
            Field::ItemPurdate,
            Lookup::LessThan,
            PredicateValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );
        assert_eq!(p.to_sql(&mut SqlParams::default()), "e.item_purdate < ?");
    }

    #[test]
    fn test_numeric_contains_uses_text_rendering() {
        let tree = compile(&[FilterRow::new("item_amount", "exact", "1500")]);
        let (sql, _) = render(&tree);
        assert_eq!(sql, "(printf('%.2f', e.item_amount) LIKE ? ESCAPE '\\')");
    }

    #[test]
    fn test_null_and_boolean() {
        let tree = compile(&[
            FilterRow::new("emp", "isnull", ""),
            FilterRow::new("is_archived", "exact", "yes"),
        ]);
        let (sql, values) = render(&tree);
        assert_eq!(sql, "(e.emp_id IS NULL AND e.is_archived = ?)");
        assert_eq!(values, vec![SqlValue::Integer(1)]);
    }

    #[test]
    fn test_decimal_equality_rounds() {
        let p = Predicate::new(Field::ItemAmount, Lookup::Equals, PredicateValue::Decimal(10.5));
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "ROUND(e.item_amount, 2) = ROUND(?, 2)");
        assert_eq!(params.values, vec![SqlValue::Real(10.5)]);
    }
}
