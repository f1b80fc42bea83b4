//! SELECT query builder.

use crate::dialect::Dialect;
use crate::pagination::PageQuery;
use crate::validate::assert_valid_sql_identifier;

use super::filter::build_filter_expr_impl;
use super::types::{FilterExpr, QueryResult, SortDir, SortField};

/// SQL query builder with dialect support.
#[derive(Debug)]
pub struct QueryBuilder<D: Dialect> {
    dialect: D,
    table: String,
    fields: Vec<String>,
    filters: Vec<FilterExpr>,
    sorts: Vec<SortField>,
    limit: Option<usize>,
}

impl<D: Dialect> QueryBuilder<D> {
    /// Create a new query builder for the given table.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(dialect: D, table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            dialect,
            table,
            fields: Vec::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
        }
    }

    /// Set the fields to SELECT. An empty list selects `*`.
    ///
    /// # Panics
    ///
    /// Panics if any field name is not a valid SQL identifier.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for field in fields {
            assert_valid_sql_identifier(field, "field");
        }
        self.fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// AND a filter expression into the WHERE clause.
    pub fn filter_expr(mut self, expr: FilterExpr) -> Self {
        self.filters.push(expr);
        self
    }

    /// Add a sort field.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn sort(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        let field = field.into();
        assert_valid_sql_identifier(&field, "sort field");
        self.sorts.push(SortField::new(field, dir));
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply a keyset page query: boundary predicate, effective ordering and
    /// the over-fetch limit.
    ///
    /// Any ordering already set on the builder is replaced, since the page
    /// query's ordering must match its predicate.
    pub fn page_query(mut self, query: &PageQuery) -> Self {
        if let Some(predicate) = &query.predicate {
            self.filters.push(predicate.clone());
        }
        self.sorts = query.ordering.clone();
        self.limit = Some(query.limit);
        self
    }

    /// Build the SQL query and parameters.
    pub fn build(self) -> QueryResult {
        let mut params =
            Vec::with_capacity(self.filters.iter().map(FilterExpr::param_count).sum());
        let mut param_idx = 1usize;

        let select_str = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields
                .iter()
                .map(|f| self.dialect.quote_ident(f))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {select_str} FROM {}",
            self.dialect.quote_ident(&self.table)
        );

        if !self.filters.is_empty() {
            let mut conditions = Vec::with_capacity(self.filters.len());
            for expr in &self.filters {
                let (condition, new_params, new_idx) =
                    build_filter_expr_impl(&self.dialect, expr, param_idx);
                conditions.push(condition);
                params.extend(new_params);
                param_idx = new_idx;
            }
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.sorts.is_empty() {
            let sort_parts: Vec<String> = self
                .sorts
                .iter()
                .map(|s| format!("{} {}", self.dialect.quote_ident(&s.field), s.dir.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&sort_parts.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        QueryResult { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::{Operator, Value, simple};
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn test_select_star() {
        let result = QueryBuilder::new(Sqlite, "events").build();
        assert_eq!(result.sql, r#"SELECT * FROM "events""#);
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_select_with_filter_sort_limit() {
        let result = QueryBuilder::new(Postgres, "events")
            .fields(&["event_id", "group"])
            .filter_expr(simple("reading", Operator::Gt, Value::Int(2)))
            .sort("group", SortDir::Desc)
            .limit(6)
            .build();

        insta::assert_snapshot!(
            result.sql,
            @r#"SELECT "event_id", "group" FROM "events" WHERE "reading" > $1 ORDER BY "group" DESC LIMIT 6"#
        );
        assert_eq!(result.params, vec![Value::Int(2)]);
    }

    #[test]
    fn test_page_query_replaces_ordering() {
        let query = PageQuery {
            predicate: Some(simple("id", Operator::Lt, Value::Int(10))),
            ordering: vec![SortField::desc("id")],
            limit: 4,
        };
        let result = QueryBuilder::new(Sqlite, "events")
            .filter_expr(simple("reading", Operator::Eq, Value::Int(1)))
            .sort("reading", SortDir::Asc)
            .page_query(&query)
            .build();

        insta::assert_snapshot!(
            result.sql,
            @r#"SELECT * FROM "events" WHERE "reading" = ?1 AND "id" < ?2 ORDER BY "id" DESC LIMIT 4"#
        );
        assert_eq!(result.params, vec![Value::Int(1), Value::Int(10)]);
    }

    #[test]
    fn test_keyword_table_name_is_quoted() {
        let result = QueryBuilder::new(Sqlite, "order").sort("group", SortDir::Asc).build();
        assert_eq!(result.sql, r#"SELECT * FROM "order" ORDER BY "group" ASC"#);
    }

    #[test]
    #[should_panic(expected = "Invalid SQL table name")]
    fn test_rejects_bad_table() {
        let _ = QueryBuilder::new(Sqlite, "events; DROP TABLE events");
    }
}
