// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # keyset-sql - Keyset Pagination over SQL and In-Memory Data
//!
//! Pages through an ordered dataset by seeking past the key of a boundary
//! row instead of skipping an offset. Cost per page does not grow with the
//! page position, and rows inserted or deleted elsewhere never shift a page.
//!
//! ## Quick Start
//!
//! ```
//! # use keyset_sql::prelude::*;
//! let keys = SortKeySpec::parse("-timestamp,group")
//!     .unwrap()
//!     .with_kind("timestamp", ValueKind::Timestamp)
//!     .unwrap();
//! let paginator = Paginator::new(keys, 3).unwrap();
//!
//! // The token a previous page handed out as `next_page_number()`
//! let cursor = paginator
//!     .validate_number(Some(r#"[false, "2017-01-01 05:23:45+00:00", "foo"]"#))
//!     .unwrap();
//! let query = paginator.page_query(cursor.as_ref()).unwrap();
//!
//! let result = sqlite("events").page_query(&query).build();
//! assert_eq!(
//!     result.sql,
//!     r#"SELECT * FROM "events" WHERE (("timestamp" < ?1 OR ("timestamp" = ?2 AND "group" > ?3)) AND "timestamp" <= ?4) ORDER BY "timestamp" DESC, "group" ASC LIMIT 4"#
//! );
//! ```
//!
//! ## Page Tokens
//!
//! | Token | Meaning |
//! |-------|---------|
//! | absent, `""`, `1` | first page |
//! | `[false, v1, ..., vn]` | rows after the key `(v1..vn)` |
//! | `[true, v1, ..., vn]` | rows before the key `(v1..vn)` |
//!
//! Tokens are not signed. A malformed token, or one with the wrong number of
//! key values, is reported with [`PaginationError::is_invalid_page`] set so
//! callers can answer with their own "invalid page" response.
//!
//! ## Data Sources
//!
//! Anything implementing [`DataSource`] can be paged. [`MemorySource`]
//! evaluates the predicate in memory; `SqliteSource` (feature `sqlite`, on by
//! default) runs it against a `rusqlite` connection.

mod builder;
mod dialect;
mod error;
mod pagination;
#[cfg(feature = "sqlite")]
mod sqlite;
mod validate;

pub use builder::{
    CompoundFilter, CursorDirection, Filter, FilterExpr, LogicalOp, Operator, QueryBuilder,
    QueryResult, SortDir, SortField, Value, ValueKind, and, or, simple,
};
pub use dialect::{Dialect, Postgres, Sqlite};
pub use error::{PageError, PaginationError};
pub use pagination::{
    Cursor, CursorError, DataSource, KeyedRow, KeysetCondition, MemorySource, Page, PageQuery,
    Paginator, SortKeySpec, format_timestamp, is_canonical_timestamp, parse_timestamp,
    timestamp_to_rfc3339,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{Record, SqliteSource};
pub use validate::{assert_valid_sql_identifier, is_valid_sql_identifier};

/// Build a query for Postgres.
///
/// Convenience function that creates a `QueryBuilder` with Postgres dialect.
#[must_use]
pub fn postgres(table: &str) -> QueryBuilder<Postgres> {
    QueryBuilder::new(Postgres, table)
}

/// Build a query for `SQLite`.
///
/// Convenience function that creates a `QueryBuilder` with `SQLite` dialect.
#[must_use]
pub fn sqlite(table: &str) -> QueryBuilder<Sqlite> {
    QueryBuilder::new(Sqlite, table)
}

/// Prelude module for convenient imports.
///
/// ```
/// use keyset_sql::prelude::*;
///
/// let paginator = Paginator::from_ordering("id", 10).unwrap();
/// let query = paginator.page_query(None).unwrap();
/// let result = postgres("users").page_query(&query).build();
/// assert_eq!(result.sql, r#"SELECT * FROM "users" ORDER BY "id" ASC LIMIT 11"#);
/// ```
pub mod prelude {
    pub use crate::{
        CompoundFilter, Cursor, CursorDirection, CursorError, DataSource, Dialect, Filter,
        FilterExpr, KeyedRow, KeysetCondition, LogicalOp, MemorySource, Operator, Page,
        PageError, PageQuery, PaginationError, Paginator, Postgres, QueryBuilder, QueryResult,
        SortDir, SortField, SortKeySpec, Sqlite, Value, ValueKind, and, or, postgres, simple,
        sqlite,
    };

    #[cfg(feature = "sqlite")]
    pub use crate::{Record, SqliteSource};
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================

#[cfg(test)]
mod api_contracts {
    use static_assertions::assert_impl_all;

    // ========================================================================
    // Pagination types
    // ========================================================================

    assert_impl_all!(crate::Cursor: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::SortKeySpec: Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::Paginator: Clone, std::fmt::Debug, Send, Sync);
    assert_impl_all!(crate::PageQuery: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::Page<std::collections::BTreeMap<String, crate::Value>>: Clone, std::fmt::Debug, PartialEq);

    // ========================================================================
    // Value and Filter types
    // ========================================================================

    // Value is Clone, Debug, PartialEq (no Eq because of Float)
    assert_impl_all!(crate::Value: Clone, std::fmt::Debug, PartialEq, PartialOrd);
    assert_impl_all!(crate::FilterExpr: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::QueryResult: Clone, std::fmt::Debug, PartialEq);

    // ========================================================================
    // Enum types
    // ========================================================================

    assert_impl_all!(crate::Operator: Copy, Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::SortDir: Copy, Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::CursorDirection: Copy, Clone, std::fmt::Debug, PartialEq, Eq, Default);
    assert_impl_all!(crate::ValueKind: Copy, Clone, std::fmt::Debug, PartialEq, Eq, Default);

    // ========================================================================
    // Error types
    // ========================================================================

    assert_impl_all!(crate::CursorError: Clone, std::fmt::Debug, PartialEq, Eq, std::error::Error, Send, Sync);
    assert_impl_all!(crate::PaginationError: Clone, std::fmt::Debug, PartialEq, Eq, std::error::Error, Send, Sync);
    assert_impl_all!(crate::PageError<std::io::Error>: std::fmt::Debug, std::error::Error, Send, Sync);
}
