//! The ordered list of key columns that defines a total order.

use std::collections::HashSet;
use std::fmt;

use crate::builder::{CursorDirection, SortField, ValueKind};
use crate::error::PaginationError;
use crate::validate::is_valid_sql_identifier;

use super::cursor::MAX_KEY_VALUES;

/// Validated sort key: non-empty, no repeated column, every column a plain
/// SQL identifier, and no more columns than a page token may carry.
///
/// The caller is responsible for making the key a total order over the
/// dataset (typically by ending it with a unique column). Key columns must
/// not hold NULLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKeySpec {
    fields: Vec<SortField>,
}

impl SortKeySpec {
    /// Validate a list of sort fields.
    pub fn new(fields: Vec<SortField>) -> Result<Self, PaginationError> {
        if fields.is_empty() {
            return Err(PaginationError::EmptySortKey);
        }
        if fields.len() > MAX_KEY_VALUES {
            return Err(PaginationError::TooManyKeyColumns {
                count: fields.len(),
                max: MAX_KEY_VALUES,
            });
        }
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !is_valid_sql_identifier(&field.field) {
                return Err(PaginationError::InvalidColumnName(field.field.clone()));
            }
            if !seen.insert(field.field.as_str()) {
                return Err(PaginationError::DuplicateSortKey(field.field.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// Parse the signed form `"-timestamp,group"`.
    ///
    /// ```
    /// use keyset_sql::{SortDir, SortKeySpec};
    ///
    /// let keys = SortKeySpec::parse("-timestamp, group").unwrap();
    /// assert_eq!(keys.len(), 2);
    /// assert_eq!(keys.fields()[0].dir, SortDir::Desc);
    /// assert_eq!(keys.to_string(), "-timestamp,group");
    /// ```
    pub fn parse(ordering: &str) -> Result<Self, PaginationError> {
        Self::new(SortField::parse_sort_string(ordering))
    }

    /// Declare the value kind of one key column.
    pub fn with_kind(mut self, column: &str, kind: ValueKind) -> Result<Self, PaginationError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.field == column)
            .ok_or_else(|| PaginationError::UnknownKeyColumn(column.to_string()))?;
        field.kind = kind;
        Ok(self)
    }

    /// Key columns in order.
    #[must_use]
    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    /// Number of key columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false` for a constructed key; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the key columns.
    pub fn iter(&self) -> std::slice::Iter<'_, SortField> {
        self.fields.iter()
    }

    /// The ordering a fetch in `direction` must use: each column flipped
    /// for a backward walk, unchanged otherwise.
    #[must_use]
    pub fn effective(&self, direction: CursorDirection) -> Vec<SortField> {
        self.fields
            .iter()
            .map(|field| SortField {
                dir: direction.effective(field.dir),
                ..field.clone()
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SortKeySpec {
    type Item = &'a SortField;
    type IntoIter = std::slice::Iter<'a, SortField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for SortKeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
