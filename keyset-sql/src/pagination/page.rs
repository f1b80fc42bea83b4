//! One materialized page of rows.

use crate::builder::CursorDirection;
use crate::error::PaginationError;

use super::cursor::Cursor;
use super::sort_key::SortKeySpec;
use super::source::KeyedRow;

/// Rows for one page, in display order, plus the navigation state derived
/// from the over-fetch.
///
/// A page is immutable. Its neighbour cursors are computed when it is built,
/// so asking for tokens cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    rows: Vec<R>,
    direction: CursorDirection,
    first_page: bool,
    continues: bool,
    next: Option<Cursor>,
    previous: Option<Cursor>,
}

impl<R: KeyedRow> Page<R> {
    /// Build a page from an over-fetched result.
    ///
    /// `rows` is what the data source returned for a query limited to
    /// `per_page + 1` rows, in the effective ordering of `cursor`.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use keyset_sql::{Page, SortKeySpec, Value};
    ///
    /// let keys = SortKeySpec::parse("id").unwrap();
    /// let rows: Vec<BTreeMap<String, Value>> = (1..=3)
    ///     .map(|id| BTreeMap::from([("id".to_string(), Value::Int(id))]))
    ///     .collect();
    ///
    /// let page = Page::materialize(rows, 2, None, &keys).unwrap();
    /// assert_eq!(page.len(), 2);
    /// assert!(page.has_next());
    /// assert!(!page.has_previous());
    /// assert_eq!(page.next_page_number().as_deref(), Some("[false, 2]"));
    /// ```
    pub fn materialize(
        mut rows: Vec<R>,
        per_page: usize,
        cursor: Option<Cursor>,
        keys: &SortKeySpec,
    ) -> Result<Self, PaginationError> {
        let direction = cursor.as_ref().map_or(CursorDirection::Forward, |c| c.direction);
        let first_page = cursor.is_none();

        let continues = rows.len() > per_page;
        rows.truncate(per_page);
        if direction.is_backward() {
            rows.reverse();
        }

        let has_next = direction.is_backward() || continues;
        let has_previous = match direction {
            CursorDirection::Forward => !first_page,
            CursorDirection::Backward => continues,
        };

        let next = match rows.last() {
            Some(row) if has_next => Some(Cursor::from_row(row, keys, CursorDirection::Forward)?),
            _ => None,
        };
        let previous = match rows.first() {
            Some(row) if has_previous => {
                Some(Cursor::from_row(row, keys, CursorDirection::Backward)?)
            },
            _ => None,
        };

        Ok(Self {
            rows,
            direction,
            first_page,
            continues,
            next,
            previous,
        })
    }
}

impl<R> Page<R> {
    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Number of rows on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the page has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Direction of the cursor that produced this page.
    #[must_use]
    pub const fn direction(&self) -> CursorDirection {
        self.direction
    }

    /// Whether the fetch returned more than `per_page` rows.
    #[must_use]
    pub const fn continues(&self) -> bool {
        self.continues
    }

    /// Whether rows exist after this page.
    ///
    /// A backward page always has a next page: the one it was reached from.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.direction.is_backward() || self.continues
    }

    /// Whether rows exist before this page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        match self.direction {
            CursorDirection::Forward => !self.first_page,
            CursorDirection::Backward => self.continues,
        }
    }

    /// Whether either neighbour exists.
    #[must_use]
    pub const fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    /// Cursor for the page after this one, taken from the last row.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<&Cursor> {
        self.next.as_ref()
    }

    /// Cursor for the page before this one, taken from the first row.
    #[must_use]
    pub const fn previous_cursor(&self) -> Option<&Cursor> {
        self.previous.as_ref()
    }

    /// Token for the next page.
    #[must_use]
    pub fn next_page_number(&self) -> Option<String> {
        self.next.as_ref().map(Cursor::encode)
    }

    /// Token for the previous page.
    #[must_use]
    pub fn previous_page_number(&self) -> Option<String> {
        self.previous.as_ref().map(Cursor::encode)
    }

    /// Numeric page position. Unknown without a full scan.
    #[must_use]
    pub const fn page_index(&self) -> Option<usize> {
        None
    }

    /// Absolute index of the first row. Unknown without a full scan.
    #[must_use]
    pub const fn start_index(&self) -> Option<usize> {
        None
    }

    /// Absolute index of the last row. Unknown without a full scan.
    #[must_use]
    pub const fn end_index(&self) -> Option<usize> {
        None
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R> IntoIterator for Page<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Page<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
