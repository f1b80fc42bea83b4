//! Error types for pagination.
//!
//! Request-level rejections (a malformed or stale page token) are kept apart
//! from construction mistakes so callers can map the former to their own
//! "not found" / "bad request" responses. Data source errors are carried
//! through [`PageError::Source`] untouched.

use thiserror::Error;

use crate::builder::ValueKind;
use crate::pagination::CursorError;

/// Errors raised by the paginator itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PaginationError {
    // ============================================================================
    // Per-request errors
    // ============================================================================
    /// The page token could not be decoded.
    #[error("invalid page token: {0}")]
    InvalidCursor(#[from] CursorError),

    /// The token carries a different number of key values than the sort key has columns.
    #[error("key length mismatch: expected {expected} key values, got {found}")]
    KeyLengthMismatch {
        /// Columns in the sort key.
        expected: usize,
        /// Values in the token.
        found: usize,
    },

    // ============================================================================
    // Construction errors
    // ============================================================================
    /// The paginator was given no ordering.
    #[error("pagination requires at least one ordering column")]
    EmptySortKey,

    /// A column appears twice in the ordering.
    #[error("column '{0}' appears more than once in the ordering")]
    DuplicateSortKey(String),

    /// The ordering has more columns than a page token can carry.
    #[error("ordering has {count} columns, at most {max} are supported")]
    TooManyKeyColumns {
        /// Columns in the ordering.
        count: usize,
        /// Largest supported key.
        max: usize,
    },

    /// A column name is not a plain SQL identifier.
    #[error("invalid key column name '{0}'")]
    InvalidColumnName(String),

    /// A table name is not a plain SQL identifier.
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// A kind was declared for a column the sort key does not contain.
    #[error("column '{0}' is not part of the sort key")]
    UnknownKeyColumn(String),

    /// `per_page` must be positive.
    #[error("per_page must be greater than zero")]
    InvalidPerPage,

    // ============================================================================
    // Row errors
    // ============================================================================
    /// A boundary row has no usable value for a key column.
    #[error("row has no {kind} value for key column '{column}'")]
    MissingKeyValue {
        /// Key column.
        column: String,
        /// Kind the column is declared as.
        kind: ValueKind,
    },

    /// A boundary row stores a timestamp key as text in a form other than
    /// `YYYY-MM-DD HH:MM:SS[.ffffff]+00:00`. The data source compares such
    /// text as written, so no token bound in the canonical form can seek it.
    #[error("key column '{column}' holds non-canonical timestamp text '{text}'")]
    NonCanonicalTimestamp {
        /// Key column.
        column: String,
        /// Text as stored.
        text: String,
    },
}

impl PaginationError {
    /// Returns `true` if the error rejects the requested page rather than
    /// signalling a programming or data problem.
    ///
    /// Includes `InvalidCursor` and `KeyLengthMismatch`.
    #[inline]
    #[must_use]
    pub const fn is_invalid_page(&self) -> bool {
        matches!(self, Self::InvalidCursor(_) | Self::KeyLengthMismatch { .. })
    }
}

/// Error returned by [`crate::Paginator::page`].
#[derive(Debug, Error)]
pub enum PageError<E> {
    /// Decoding the token or materializing the page failed.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// The data source failed; passed through unmodified.
    #[error("data source error: {0}")]
    Source(#[source] E),
}

impl<E> PageError<E> {
    /// Returns `true` if the requested page was rejected.
    #[must_use]
    pub const fn is_invalid_page(&self) -> bool {
        match self {
            Self::Pagination(err) => err.is_invalid_page(),
            Self::Source(_) => false,
        }
    }

    /// The data source error, if that is what failed.
    pub const fn source_error(&self) -> Option<&E> {
        match self {
            Self::Source(err) => Some(err),
            Self::Pagination(_) => None,
        }
    }
}
