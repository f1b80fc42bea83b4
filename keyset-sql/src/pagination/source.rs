//! The data source contract and an in-memory reference adapter.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

use crate::builder::{FilterExpr, SortDir, SortField, Value};

/// Typed access to a row's key column values.
pub trait KeyedRow {
    /// The row's value for `column`, or `None` if it has none (missing or NULL).
    fn key_value(&self, column: &str) -> Option<Value>;
}

impl<R: KeyedRow + ?Sized> KeyedRow for &R {
    fn key_value(&self, column: &str) -> Option<Value> {
        (**self).key_value(column)
    }
}

impl KeyedRow for BTreeMap<String, Value> {
    fn key_value(&self, column: &str) -> Option<Value> {
        self.get(column).cloned()
    }
}

impl<S: std::hash::BuildHasher> KeyedRow for HashMap<String, Value, S> {
    fn key_value(&self, column: &str) -> Option<Value> {
        self.get(column).cloned()
    }
}

/// One fetch: a boundary predicate, the ordering to return rows in and a
/// row limit.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Boundary predicate; `None` on the first page.
    pub predicate: Option<FilterExpr>,
    /// Effective ordering.
    pub ordering: Vec<SortField>,
    /// Maximum number of rows to return (`per_page + 1`).
    pub limit: usize,
}

/// Anything that can answer a [`PageQuery`].
///
/// Implementations must apply the predicate, return rows in the given
/// ordering and return no more than `limit` rows.
pub trait DataSource {
    /// Row type handed back to the caller.
    type Row: KeyedRow;
    /// The source's own error, passed through the paginator untouched.
    type Error;

    /// Run the query.
    fn fetch(&self, query: &PageQuery) -> Result<Vec<Self::Row>, Self::Error>;
}

impl<S: DataSource + ?Sized> DataSource for &S {
    type Row = S::Row;
    type Error = S::Error;

    fn fetch(&self, query: &PageQuery) -> Result<Vec<Self::Row>, Self::Error> {
        (**self).fetch(query)
    }
}

/// A data source over rows held in memory.
///
/// Evaluates the predicate tree directly, then stable-sorts the survivors by
/// the requested ordering. Useful for tests and for paging small collections
/// that are already loaded.
#[derive(Debug, Clone, Default)]
pub struct MemorySource<R> {
    rows: Vec<R>,
}

impl<R> MemorySource<R> {
    /// Wrap a collection of rows.
    #[must_use]
    pub const fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    /// The wrapped rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }
}

impl<R> FromIterator<R> for MemorySource<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R: KeyedRow + Clone> DataSource for MemorySource<R> {
    type Row = R;
    type Error = Infallible;

    fn fetch(&self, query: &PageQuery) -> Result<Vec<R>, Infallible> {
        let mut rows: Vec<R> = self
            .rows
            .iter()
            .filter(|row| {
                query
                    .predicate
                    .as_ref()
                    .is_none_or(|predicate| predicate.matches(&|column: &str| row.key_value(column)))
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| compare_rows(a, b, &query.ordering));
        rows.truncate(query.limit);
        Ok(rows)
    }
}

/// Compare two rows column by column. Missing or incomparable values
/// count as equal so the sort stays stable.
fn compare_rows<R: KeyedRow>(a: &R, b: &R, ordering: &[SortField]) -> Ordering {
    for sort in ordering {
        let ord = match (a.key_value(&sort.field), b.key_value(&sort.field)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };
        let ord = match sort.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Operator, simple};

    fn row(id: i64, name: &str) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::Text(name.to_string())),
        ])
    }

    fn ids(rows: &[BTreeMap<String, Value>]) -> Vec<i64> {
        rows.iter()
            .map(|r| match r.key_value("id") {
                Some(Value::Int(id)) => id,
                other => panic!("unexpected id {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_memory_source_orders_and_limits() {
        let source: MemorySource<_> = [row(3, "c"), row(1, "a"), row(2, "b")].into_iter().collect();
        let rows = source
            .fetch(&PageQuery {
                predicate: None,
                ordering: vec![SortField::desc("id")],
                limit: 2,
            })
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 2]);
    }

    #[test]
    fn test_memory_source_applies_predicate() {
        let source = MemorySource::new(vec![row(1, "a"), row(2, "b"), row(3, "c")]);
        let rows = source
            .fetch(&PageQuery {
                predicate: Some(simple("name", Operator::Gte, Value::Text("b".into()))),
                ordering: vec![SortField::asc("id")],
                limit: 10,
            })
            .unwrap();
        assert_eq!(ids(&rows), vec![2, 3]);
    }

    #[test]
    fn test_tie_breaks_on_later_columns() {
        let source = MemorySource::new(vec![row(2, "x"), row(1, "x"), row(3, "a")]);
        let rows = source
            .fetch(&PageQuery {
                predicate: None,
                ordering: vec![SortField::asc("name"), SortField::desc("id")],
                limit: 10,
            })
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 2, 1]);
    }

    #[test]
    fn test_hash_map_rows() {
        let row: HashMap<String, Value> = HashMap::from([("id".to_string(), Value::Int(7))]);
        assert_eq!(row.key_value("id"), Some(Value::Int(7)));
        assert_eq!(row.key_value("missing"), None);
    }
}
