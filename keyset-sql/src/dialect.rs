//! Placeholder and quoting rules for the databases page queries target.
//!
//! Keyset predicates only need two things from a dialect: how to number a
//! bound parameter and how to quote a key column.

/// Database-specific rendering used by the query builder.
pub trait Dialect: Clone + Copy {
    /// Placeholder for the `idx`-th bound parameter (1-based).
    fn param(&self, idx: usize) -> String;

    /// Quote a column identifier.
    ///
    /// Both supported dialects use standard double quotes, which keeps key
    /// columns named after keywords (`group`, `order`) usable. Embedded quotes
    /// are doubled.
    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }
}
