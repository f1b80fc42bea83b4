//! Keyset (seek) pagination.
//!
//! A page is addressed by a token carrying the key values of a boundary row
//! and a direction, never by an offset:
//!
//! ```text
//! [false, "2017-01-01 05:23:45+00:00", "foo"]   rows after this key
//! [true, "2017-01-01 01:23:45+00:00", "qux"]    rows before this key
//! ```
//!
//! The [`Paginator`] decodes the token ([`Cursor`]), turns it into a
//! boundary predicate and effective ordering ([`KeysetCondition`]), asks a
//! [`DataSource`] for `per_page + 1` rows and builds a [`Page`] from the
//! result. No count query is ever issued, so totals and page numbers are
//! always reported as unknown.
//!
//! # Example
//!
//! ```
//! use keyset_sql::{Cursor, Paginator, SortKeySpec, ValueKind};
//!
//! let keys = SortKeySpec::parse("-timestamp,group")
//!     .unwrap()
//!     .with_kind("timestamp", ValueKind::Timestamp)
//!     .unwrap();
//! let paginator = Paginator::new(keys, 20).unwrap();
//!
//! let cursor = paginator
//!     .validate_number(Some(r#"[false, "2017-01-01 05:23:45+00:00", "foo"]"#))
//!     .unwrap();
//! let query = paginator.page_query(cursor.as_ref()).unwrap();
//! assert_eq!(query.limit, 21);
//! assert!(query.predicate.is_some());
//! ```

mod cursor;
mod encoding;
mod keyset;
mod page;
mod paginator;
mod sort_key;
mod source;
mod value_conv;

pub use cursor::{Cursor, CursorError};
pub use keyset::KeysetCondition;
pub use page::Page;
pub use paginator::Paginator;
pub use sort_key::SortKeySpec;
pub use source::{DataSource, KeyedRow, MemorySource, PageQuery};
pub use value_conv::{
    format_timestamp, is_canonical_timestamp, parse_timestamp, timestamp_to_rfc3339,
};
