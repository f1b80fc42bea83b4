//! Stateless keyset paginator.

use std::ops::Range;

use tracing::{debug, warn};

use crate::builder::SortField;
use crate::error::{PageError, PaginationError};

use super::cursor::Cursor;
use super::keyset::KeysetCondition;
use super::page::Page;
use super::sort_key::SortKeySpec;
use super::source::{DataSource, KeyedRow, PageQuery};

/// Pages through a data source by sort key.
///
/// Holds no state between calls: a page is a function of the sort key,
/// `per_page`, the token and what the data source contains at call time.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use keyset_sql::{MemorySource, Paginator, Value};
///
/// let source: MemorySource<BTreeMap<String, Value>> = (1..=5)
///     .map(|id| BTreeMap::from([("id".to_string(), Value::Int(id))]))
///     .collect();
/// let paginator = Paginator::from_ordering("-id", 2).unwrap();
///
/// let first = paginator.page(&source, None).unwrap();
/// assert_eq!(first.next_page_number().as_deref(), Some("[false, 4]"));
///
/// let second = paginator.page(&source, first.next_page_number().as_deref()).unwrap();
/// assert_eq!(second.len(), 2);
/// assert_eq!(second.previous_page_number().as_deref(), Some("[true, 3]"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    keys: SortKeySpec,
    per_page: usize,
}

impl Paginator {
    /// Create a paginator. `per_page` must be positive.
    pub fn new(keys: SortKeySpec, per_page: usize) -> Result<Self, PaginationError> {
        if per_page == 0 {
            return Err(PaginationError::InvalidPerPage);
        }
        Ok(Self { keys, per_page })
    }

    /// Create a paginator from the signed ordering form `"-timestamp,group"`.
    pub fn from_ordering(ordering: &str, per_page: usize) -> Result<Self, PaginationError> {
        Self::new(SortKeySpec::parse(ordering)?, per_page)
    }

    /// The sort key.
    #[must_use]
    pub const fn keys(&self) -> &SortKeySpec {
        &self.keys
    }

    /// Rows per page.
    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total row count. Unknown without a full scan.
    #[must_use]
    pub const fn count(&self) -> Option<usize> {
        None
    }

    /// Total page count. Unknown without a full scan.
    #[must_use]
    pub const fn num_pages(&self) -> Option<usize> {
        None
    }

    /// Page numbers. Always empty: pages have no stable numbering.
    #[must_use]
    pub const fn page_range(&self) -> Range<usize> {
        0..0
    }

    /// Decode a page token against this paginator's sort key.
    ///
    /// `None`, `""` and `"1"` name the first page and decode to `Ok(None)`.
    pub fn validate_number(&self, token: Option<&str>) -> Result<Option<Cursor>, PaginationError> {
        let Some(token) = token else {
            return Ok(None);
        };
        Cursor::decode(token, &self.keys).inspect_err(|err| {
            warn!(token = %token, error = %err, "Rejected page token");
        })
    }

    /// The query that fetches the page after (or before) `cursor`.
    ///
    /// The limit is `per_page + 1`; the extra row tells the page whether the
    /// walk continues.
    pub fn page_query(&self, cursor: Option<&Cursor>) -> Result<PageQuery, PaginationError> {
        let limit = self.per_page.saturating_add(1);
        match cursor {
            None => Ok(PageQuery {
                predicate: None,
                ordering: self.keys.fields().to_vec(),
                limit,
            }),
            Some(cursor) => {
                let condition = KeysetCondition::new(&self.keys, cursor)?;
                Ok(PageQuery {
                    predicate: Some(condition.to_filter_expr()),
                    ordering: condition.sort_fields,
                    limit,
                })
            },
        }
    }

    /// Build a page from rows fetched with [`Paginator::page_query`].
    pub fn materialize<R: KeyedRow>(
        &self,
        rows: Vec<R>,
        cursor: Option<Cursor>,
    ) -> Result<Page<R>, PaginationError> {
        Page::materialize(rows, self.per_page, cursor, &self.keys)
    }

    /// Fetch the page named by `token`.
    ///
    /// Errors from the data source come back as [`PageError::Source`]
    /// unchanged; a bad token is a [`PageError::Pagination`] for which
    /// [`PageError::is_invalid_page`] is `true`.
    pub fn page<S: DataSource>(
        &self,
        source: &S,
        token: Option<&str>,
    ) -> Result<Page<S::Row>, PageError<S::Error>> {
        let cursor = self.validate_number(token)?;
        self.page_at(source, cursor)
    }

    /// Fetch the page after (or before) an already decoded cursor.
    pub fn page_at<S: DataSource>(
        &self,
        source: &S,
        cursor: Option<Cursor>,
    ) -> Result<Page<S::Row>, PageError<S::Error>> {
        let query = self.page_query(cursor.as_ref())?;
        let rows = source.fetch(&query).map_err(PageError::Source)?;

        debug!(
            direction = ?cursor.as_ref().map(|c| c.direction),
            ordering = %ordering_label(&query.ordering),
            limit = query.limit,
            rows = rows.len(),
            "Fetched page"
        );

        Ok(self.materialize(rows, cursor)?)
    }
}

fn ordering_label(ordering: &[SortField]) -> String {
    ordering
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
