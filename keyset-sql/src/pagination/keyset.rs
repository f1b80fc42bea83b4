//! Keyset pagination condition generation.

use crate::builder::{
    CursorDirection, Filter, FilterExpr, Operator, SortField, Value, and, or,
};
use crate::error::PaginationError;

use super::cursor::Cursor;
use super::sort_key::SortKeySpec;

/// Boundary condition for one seek: the sort key walked in the cursor's
/// direction, paired with the cursor's key values.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetCondition {
    /// Sort fields with their effective (direction-adjusted) order.
    pub sort_fields: Vec<SortField>,
    /// The cursor values for each field.
    pub cursor_values: Vec<Value>,
    /// Which way the cursor walks.
    pub direction: CursorDirection,
}

impl KeysetCondition {
    /// Pair a sort key with a decoded cursor.
    ///
    /// Fails with `KeyLengthMismatch` when the cursor does not carry exactly
    /// one value per key column.
    pub fn new(keys: &SortKeySpec, cursor: &Cursor) -> Result<Self, PaginationError> {
        if cursor.values.len() != keys.len() {
            return Err(PaginationError::KeyLengthMismatch {
                expected: keys.len(),
                found: cursor.values.len(),
            });
        }

        Ok(Self {
            sort_fields: keys.effective(cursor.direction),
            cursor_values: cursor.values.clone(),
            direction: cursor.direction,
        })
    }

    /// Ordering the data source must return rows in.
    #[must_use]
    pub fn ordering(&self) -> &[SortField] {
        &self.sort_fields
    }

    /// Full boundary predicate: the seek disjunction AND-ed with the
    /// leading-column index hint.
    ///
    /// For `(a ASC, b DESC)` after `(1, 2)` this is:
    ///
    /// ```text
    /// ((a > 1 OR (a = 1 AND b < 2)) AND a >= 1)
    /// ```
    #[must_use]
    pub fn to_filter_expr(&self) -> FilterExpr {
        let seek = self.seek_expr();
        match self.index_hint() {
            Some(hint) => and(vec![seek, hint]),
            None => seek,
        }
    }

    /// Row-value comparison `(c1..cn) > (v1..vn)` unrolled into
    /// `(c1 op v1) OR (c1 = v1 AND c2 op v2) OR ...`.
    ///
    /// Each branch compares strictly on column `i` and requires equality on
    /// every column before it. Single-column branches are not wrapped.
    #[must_use]
    pub fn seek_expr(&self) -> FilterExpr {
        let pairs: Vec<_> = self.sort_fields.iter().zip(&self.cursor_values).collect();

        let mut branches = Vec::with_capacity(pairs.len());
        for (i, (sort, value)) in pairs.iter().enumerate() {
            let mut conditions: Vec<FilterExpr> = pairs
                .iter()
                .take(i)
                .map(|(prefix, prefix_value)| compare(&prefix.field, Operator::Eq, prefix_value))
                .collect();
            conditions.push(compare(&sort.field, Operator::seek(sort.dir, false), value));

            branches.push(collapse(conditions, and));
        }

        collapse(branches, or)
    }

    /// Inclusive comparison on the leading column alone (`c1 >= v1` or
    /// `c1 <= v1`). It never narrows the result set and lets an index on
    /// the leading column bound the scan.
    #[must_use]
    pub fn index_hint(&self) -> Option<FilterExpr> {
        let sort = self.sort_fields.first()?;
        let value = self.cursor_values.first()?;
        Some(compare(&sort.field, Operator::seek(sort.dir, true), value))
    }
}

fn compare(field: &str, op: Operator, value: &Value) -> FilterExpr {
    FilterExpr::Simple(Filter {
        field: field.to_string(),
        op,
        value: value.clone(),
    })
}

/// Combine with `group`, unless there is just one expression.
fn collapse(mut exprs: Vec<FilterExpr>, group: fn(Vec<FilterExpr>) -> FilterExpr) -> FilterExpr {
    if exprs.len() == 1
        && let Some(only) = exprs.pop()
    {
        return only;
    }
    group(exprs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CompoundFilter, LogicalOp, SortDir};

    fn keys(ordering: &str) -> SortKeySpec {
        SortKeySpec::parse(ordering).unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    fn simple_parts(expr: &FilterExpr) -> (&str, Operator) {
        match expr {
            FilterExpr::Simple(f) => (f.field.as_str(), f.op),
            FilterExpr::Compound(_) => panic!("Expected simple filter, got {expr:?}"),
        }
    }

    fn compound(expr: &FilterExpr) -> &CompoundFilter {
        match expr {
            FilterExpr::Compound(c) => c,
            FilterExpr::Simple(_) => panic!("Expected compound filter, got {expr:?}"),
        }
    }

    #[test]
    fn test_single_column_keeps_index_hint() {
        let condition =
            KeysetCondition::new(&keys("id"), &Cursor::forward(ints(&[100]))).unwrap();
        let expr = condition.to_filter_expr();

        let top = compound(&expr);
        assert_eq!(top.op, LogicalOp::And);
        assert_eq!(simple_parts(&top.filters[0]), ("id", Operator::Gt));
        assert_eq!(simple_parts(&top.filters[1]), ("id", Operator::Gte));
    }

    #[test]
    fn test_desc_forward_uses_less_than() {
        let condition =
            KeysetCondition::new(&keys("-created_at"), &Cursor::forward(ints(&[5]))).unwrap();
        assert_eq!(simple_parts(&condition.seek_expr()), ("created_at", Operator::Lt));
        assert_eq!(
            simple_parts(&condition.index_hint().unwrap()),
            ("created_at", Operator::Lte)
        );
    }

    #[test]
    fn test_backward_flips_each_column() {
        let condition =
            KeysetCondition::new(&keys("a,-b"), &Cursor::backward(ints(&[1, 2]))).unwrap();
        assert_eq!(condition.ordering()[0].dir, SortDir::Desc);
        assert_eq!(condition.ordering()[1].dir, SortDir::Asc);

        let seek = condition.seek_expr();
        let branches = &compound(&seek).filters;
        assert_eq!(simple_parts(&branches[0]), ("a", Operator::Lt));
        let second = compound(&branches[1]);
        assert_eq!(simple_parts(&second.filters[0]), ("a", Operator::Eq));
        assert_eq!(simple_parts(&second.filters[1]), ("b", Operator::Gt));
    }

    #[test]
    fn test_three_columns_use_full_equality_prefix() {
        let condition =
            KeysetCondition::new(&keys("a,b,c"), &Cursor::forward(ints(&[1, 2, 3]))).unwrap();
        let seek = condition.seek_expr();
        let top = compound(&seek);
        assert_eq!(top.op, LogicalOp::Or);
        assert_eq!(top.filters.len(), 3);

        let third = compound(&top.filters[2]);
        assert_eq!(third.op, LogicalOp::And);
        let parts: Vec<_> = third.filters.iter().map(simple_parts).collect();
        assert_eq!(
            parts,
            vec![("a", Operator::Eq), ("b", Operator::Eq), ("c", Operator::Gt)]
        );
    }

    #[test]
    fn test_predicate_matches_lexicographic_order() {
        let condition =
            KeysetCondition::new(&keys("a,-b"), &Cursor::forward(ints(&[1, 5]))).unwrap();
        let expr = condition.to_filter_expr();

        let row = |a: i64, b: i64| {
            move |column: &str| match column {
                "a" => Some(Value::Int(a)),
                "b" => Some(Value::Int(b)),
                _ => None,
            }
        };
        assert!(expr.matches(&row(1, 4)));
        assert!(expr.matches(&row(2, 9)));
        assert!(!expr.matches(&row(1, 5)));
        assert!(!expr.matches(&row(1, 6)));
        assert!(!expr.matches(&row(0, 0)));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = KeysetCondition::new(&keys("a,b"), &Cursor::forward(ints(&[1]))).unwrap_err();
        assert_eq!(
            err,
            PaginationError::KeyLengthMismatch {
                expected: 2,
                found: 1
            }
        );
    }
}
