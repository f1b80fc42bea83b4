//! Lowering of [`FilterExpr`] trees into parameterized SQL.

use super::types::{CompoundFilter, Filter, FilterExpr, LogicalOp, Value};
use crate::dialect::Dialect;

/// Build a filter expression (simple or compound).
///
/// Returns the SQL fragment, the values to bind, and the next free
/// placeholder index.
pub(super) fn build_filter_expr_impl<D: Dialect>(
    dialect: &D,
    expr: &FilterExpr,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    match expr {
        FilterExpr::Simple(filter) => build_condition_impl(dialect, filter, start_idx),
        FilterExpr::Compound(compound) => build_compound_filter_impl(dialect, compound, start_idx),
    }
}

/// Build a compound filter (AND, OR).
pub(super) fn build_compound_filter_impl<D: Dialect>(
    dialect: &D,
    compound: &CompoundFilter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let mut idx = start_idx;
    let mut all_params = Vec::new();
    let mut conditions = Vec::with_capacity(compound.filters.len());

    for filter_expr in &compound.filters {
        let (condition, params, new_idx) = build_filter_expr_impl(dialect, filter_expr, idx);
        conditions.push(condition);
        all_params.extend(params);
        idx = new_idx;
    }

    let joiner = match compound.op {
        LogicalOp::And => " AND ",
        LogicalOp::Or => " OR ",
    };

    let sql = match conditions.len() {
        // An empty AND is vacuously true, an empty OR never matches.
        0 => match compound.op {
            LogicalOp::And => "1=1".to_string(),
            LogicalOp::Or => "1=0".to_string(),
        },
        1 => conditions.swap_remove(0),
        _ => format!("({})", conditions.join(joiner)),
    };

    (sql, all_params, idx)
}

/// Build a single column comparison.
pub(super) fn build_condition_impl<D: Dialect>(
    dialect: &D,
    filter: &Filter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let sql = format!(
        "{} {} {}",
        dialect.quote_ident(&filter.field),
        filter.op.as_sql(),
        dialect.param(start_idx)
    );
    (sql, vec![filter.value.clone()], start_idx + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::{Operator, and, or, simple};
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn test_simple_condition_postgres() {
        let filter = Filter {
            field: "timestamp".to_string(),
            op: Operator::Gte,
            value: Value::Int(5),
        };
        let (sql, params, idx) = build_condition_impl(&Postgres, &filter, 3);
        assert_eq!(sql, "\"timestamp\" >= $3");
        assert_eq!(params, vec![Value::Int(5)]);
        assert_eq!(idx, 4);
    }

    #[test]
    fn test_nested_compound_sqlite() {
        let expr = or(vec![
            simple("a", Operator::Gt, Value::Int(1)),
            and(vec![
                simple("a", Operator::Eq, Value::Int(1)),
                simple("b", Operator::Lt, Value::Text("x".into())),
            ]),
        ]);
        let (sql, params, idx) = build_filter_expr_impl(&Sqlite, &expr, 1);
        assert_eq!(sql, "(\"a\" > ?1 OR (\"a\" = ?2 AND \"b\" < ?3))");
        assert_eq!(params.len(), 3);
        assert_eq!(idx, 4);
    }

    #[test]
    fn test_single_child_compound_collapses() {
        let expr = and(vec![simple("a", Operator::Lt, Value::Int(1))]);
        let (sql, _, _) = build_filter_expr_impl(&Postgres, &expr, 1);
        assert_eq!(sql, "\"a\" < $1");
    }

    #[test]
    fn test_empty_compound() {
        let (sql, params, idx) = build_filter_expr_impl(&Sqlite, &and(vec![]), 1);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
        assert_eq!(idx, 1);

        let (sql, _, _) = build_filter_expr_impl(&Sqlite, &or(vec![]), 1);
        assert_eq!(sql, "1=0");
    }
}
