//! SQLite data source backed by `rusqlite`.
//!
//! Page queries are lowered through [`QueryBuilder`] with the [`Sqlite`]
//! dialect and run with bound parameters. Timestamps are bound in their token
//! text form (`2017-01-01 05:23:45+00:00`), so a `TEXT` column written in that
//! form compares and sorts correctly. SQLite compares text byte by byte, so a
//! timestamp key column stored in any other form is rejected with
//! [`PaginationError::NonCanonicalTimestamp`] when a boundary row is read.

use std::collections::BTreeMap;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::debug;

use crate::builder::{FilterExpr, QueryBuilder, QueryResult, Value};
use crate::dialect::Sqlite;
use crate::error::PaginationError;
use crate::pagination::{DataSource, KeyedRow, PageQuery, format_timestamp};
use crate::validate::is_valid_sql_identifier;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Bool(b) => ToSqlOutput::from(*b),
            Self::Int(i) => ToSqlOutput::from(*i),
            Self::Float(f) => ToSqlOutput::from(*f),
            Self::Text(s) | Self::Range(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Timestamp(ts) => ToSqlOutput::from(format_timestamp(ts)),
        })
    }
}

/// A row read from SQLite: column name to value.
///
/// NULL and BLOB columns are left out, so they read as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    /// Value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Columns and values, ordered by column name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn from_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Self> {
        let mut values = BTreeMap::new();
        for (idx, column) in columns.iter().enumerate() {
            let value = match row.get_ref(idx)? {
                ValueRef::Integer(i) => Value::Int(i),
                ValueRef::Real(f) => Value::Float(f),
                ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
                ValueRef::Null | ValueRef::Blob(_) => continue,
            };
            values.insert(column.clone(), value);
        }
        Ok(Self(values))
    }
}

impl KeyedRow for Record {
    fn key_value(&self, column: &str) -> Option<Value> {
        self.0.get(column).cloned()
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }
}

/// Pages over one SQLite table.
///
/// ```
/// use keyset_sql::{Paginator, SqliteSource};
/// use rusqlite::Connection;
///
/// let conn = Connection::open_in_memory().unwrap();
/// conn.execute_batch(
///     "CREATE TABLE items (id INTEGER PRIMARY KEY);
///      INSERT INTO items (id) VALUES (1), (2), (3);",
/// )
/// .unwrap();
///
/// let source = SqliteSource::new(&conn, "items").unwrap();
/// let paginator = Paginator::from_ordering("id", 2).unwrap();
/// let page = paginator.page(&source, None).unwrap();
///
/// assert_eq!(page.len(), 2);
/// assert_eq!(page.next_page_number().as_deref(), Some("[false, 2]"));
/// ```
#[derive(Debug)]
pub struct SqliteSource<'conn> {
    conn: &'conn Connection,
    table: String,
    fields: Vec<String>,
    filter: Option<FilterExpr>,
}

impl<'conn> SqliteSource<'conn> {
    /// Page over `table`, selecting every column.
    pub fn new(conn: &'conn Connection, table: impl Into<String>) -> Result<Self, PaginationError> {
        let table = table.into();
        if !is_valid_sql_identifier(&table) {
            return Err(PaginationError::InvalidTableName(table));
        }
        Ok(Self {
            conn,
            table,
            fields: Vec::new(),
            filter: None,
        })
    }

    /// Select only these columns. They must include every key column.
    pub fn with_fields<I, S>(mut self, fields: I) -> Result<Self, PaginationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if let Some(bad) = fields.iter().find(|f| !is_valid_sql_identifier(f)) {
            return Err(PaginationError::InvalidColumnName(bad.clone()));
        }
        self.fields = fields;
        Ok(self)
    }

    /// Restrict every page to rows matching `filter`. It is AND-ed in front
    /// of the keyset predicate.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Render the SQL for a page query without running it.
    pub fn query(&self, query: &PageQuery) -> QueryResult {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        let mut builder = QueryBuilder::new(Sqlite, &self.table).fields(&fields);
        if let Some(filter) = &self.filter {
            builder = builder.filter_expr(filter.clone());
        }
        builder.page_query(query).build()
    }
}

impl DataSource for SqliteSource<'_> {
    type Row = Record;
    type Error = rusqlite::Error;

    fn fetch(&self, query: &PageQuery) -> Result<Vec<Record>, rusqlite::Error> {
        let QueryResult { sql, params } = self.query(query);
        debug!(sql = %sql, params = params.len(), "Running page query");

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Record::from_row(row, &columns)
        })?;
        rows.collect()
    }
}
