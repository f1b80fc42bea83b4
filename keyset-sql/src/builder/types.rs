//! Core types shared by the predicate tree, the SQL builder and the paginator.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::validate::assert_valid_sql_identifier;

/// Comparison operators a boundary predicate can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal: `=`
    Eq,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Gte,
    /// Less than: `<`
    Lt,
    /// Less than or equal: `<=`
    Lte,
}

impl Operator {
    /// The operator that walks past a cursor value for a column sorted in `dir`.
    ///
    /// Ascending columns move forward with `>`, descending ones with `<`.
    /// `inclusive` selects `>=` / `<=` instead.
    #[must_use]
    pub const fn seek(dir: SortDir, inclusive: bool) -> Self {
        match (dir, inclusive) {
            (SortDir::Asc, false) => Self::Gt,
            (SortDir::Asc, true) => Self::Gte,
            (SortDir::Desc, false) => Self::Lt,
            (SortDir::Desc, true) => Self::Lte,
        }
    }

    /// SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Whether `ordering` (column value compared to operand) satisfies the operator.
    #[must_use]
    pub const fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Gte => !matches!(ordering, Ordering::Less),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
        }
    }
}

/// Logical operators for compound filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// All conditions must match: `AND`
    And,
    /// At least one condition must match: `OR`
    Or,
}

/// A boolean expression over column comparisons.
///
/// This is the form a boundary predicate takes before an adapter lowers it
/// into a data source's native filter syntax (see [`crate::QueryBuilder`]) or
/// evaluates it directly (see [`FilterExpr::matches`]).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// A single column comparison.
    Simple(Filter),
    /// A compound filter with logical operator.
    Compound(CompoundFilter),
}

impl FilterExpr {
    /// Evaluate the expression against a row.
    ///
    /// `lookup` returns the row's value for a column. A missing value or an
    /// incomparable pair of values never satisfies a comparison.
    pub fn matches<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        match self {
            Self::Simple(filter) => lookup(&filter.field)
                .and_then(|actual| actual.partial_cmp(&filter.value))
                .is_some_and(|ordering| filter.op.accepts(ordering)),
            Self::Compound(compound) => match compound.op {
                LogicalOp::And => compound.filters.iter().all(|f| f.matches(lookup)),
                LogicalOp::Or => compound.filters.iter().any(|f| f.matches(lookup)),
            },
        }
    }

    /// Number of bound values the expression carries.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Self::Simple(_) => 1,
            Self::Compound(compound) => compound.filters.iter().map(Self::param_count).sum(),
        }
    }
}

/// A compound filter combining multiple expressions with a logical operator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundFilter {
    /// How the children combine.
    pub op: LogicalOp,
    /// Child expressions, in order.
    pub filters: Vec<FilterExpr>,
}

impl CompoundFilter {
    /// Create an AND compound filter.
    #[must_use]
    pub const fn and(filters: Vec<FilterExpr>) -> Self {
        Self {
            op: LogicalOp::And,
            filters,
        }
    }

    /// Create an OR compound filter.
    #[must_use]
    pub const fn or(filters: Vec<FilterExpr>) -> Self {
        Self {
            op: LogicalOp::Or,
            filters,
        }
    }
}

/// Single column comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name.
    pub field: String,
    /// Comparison operator.
    pub op: Operator,
    /// Operand the column is compared to.
    pub value: Value,
}

/// Scalar key value.
///
/// Key columns never hold NULL: callers must filter nulls out of the sort key
/// themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Text.
    Text(String),
    /// Instant in UTC.
    Timestamp(DateTime<Utc>),
    /// Range literal such as `[2019-07-01, 2019-07-02)`, kept in the data
    /// source's own text form.
    Range(String),
}

impl Value {
    /// The kind this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Range(_) => ValueKind::Range,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) | (Self::Range(a), Self::Range(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) | Self::Range(s) => f.write_str(s),
            Self::Timestamp(ts) => f.write_str(&crate::pagination::format_timestamp(ts)),
        }
    }
}

/// Declared type of a sort key column.
///
/// Used to coerce cursor values (and row values read back from a data source)
/// into the right [`Value`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Keep whatever shape the value arrives in.
    #[default]
    Any,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Float; integers widen.
    Float,
    /// Text.
    Text,
    /// Timestamp parsed from its text form.
    Timestamp,
    /// Range literal.
    Range,
}

impl ValueKind {
    /// Lower-case name, as accepted by [`ValueKind::from_str`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" | "real" => Ok(Self::Float),
            "text" | "string" => Ok(Self::Text),
            "timestamp" | "datetime" => Ok(Self::Timestamp),
            "range" => Ok(Self::Range),
            other => Err(format!("unknown value kind '{other}'")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDir {
    /// Reverse the sort direction (Asc <-> Desc).
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// SQL keyword for the direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One column of a sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Column name.
    pub field: String,
    /// Declared direction.
    pub dir: SortDir,
    /// Declared value kind, used when decoding cursors.
    pub kind: ValueKind,
}

impl SortField {
    /// Create a new sort field of kind [`ValueKind::Any`].
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
            kind: ValueKind::Any,
        }
    }

    /// Ascending sort field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDir::Asc)
    }

    /// Descending sort field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDir::Desc)
    }

    /// Set the value kind.
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Parse a sort string like `"-timestamp,group"` into sort fields.
    ///
    /// Fields prefixed with `-` are sorted descending. Blank segments are
    /// skipped; validation of the resulting list happens in
    /// [`crate::SortKeySpec::new`].
    #[must_use]
    pub fn parse_sort_string(sort: &str) -> Vec<Self> {
        sort.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.strip_prefix('-') {
                Some(stripped) => Self::desc(stripped.trim()),
                None => Self::asc(part.strip_prefix('+').unwrap_or(part).trim()),
            })
            .collect()
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            SortDir::Asc => f.write_str(&self.field),
            SortDir::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Query result with SQL string and parameters.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    /// Rendered SQL with dialect placeholders.
    pub sql: String,
    /// Values bound to the placeholders, in order.
    pub params: Vec<Value>,
}

/// Which way a cursor walks relative to the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorDirection {
    /// Rows after the cursor ("next").
    #[default]
    Forward,
    /// Rows before the cursor ("previous").
    Backward,
}

impl CursorDirection {
    /// Whether this is a backward walk.
    #[must_use]
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }

    /// Direction a column is actually compared and ordered in for this walk.
    #[must_use]
    pub const fn effective(self, dir: SortDir) -> SortDir {
        match self {
            Self::Forward => dir,
            Self::Backward => dir.reverse(),
        }
    }
}

/// Helper function to create a simple filter expression.
///
/// # Panics
///
/// Panics if the field name is not a valid SQL identifier.
pub fn simple(field: impl Into<String>, op: Operator, value: Value) -> FilterExpr {
    let field = field.into();
    assert_valid_sql_identifier(&field, "filter field");
    FilterExpr::Simple(Filter { field, op, value })
}

/// Helper function to create an AND compound filter.
#[must_use]
pub const fn and(filters: Vec<FilterExpr>) -> FilterExpr {
    FilterExpr::Compound(CompoundFilter::and(filters))
}

/// Helper function to create an OR compound filter.
#[must_use]
pub const fn or(filters: Vec<FilterExpr>) -> FilterExpr {
    FilterExpr::Compound(CompoundFilter::or(filters))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(column: &str) -> Option<Value> {
        match column {
            "a" => Some(Value::Int(2)),
            "b" => Some(Value::Text("m".into())),
            _ => None,
        }
    }

    #[test]
    fn test_operator_seek() {
        assert_eq!(Operator::seek(SortDir::Asc, false), Operator::Gt);
        assert_eq!(Operator::seek(SortDir::Asc, true), Operator::Gte);
        assert_eq!(Operator::seek(SortDir::Desc, false), Operator::Lt);
        assert_eq!(Operator::seek(SortDir::Desc, true), Operator::Lte);
    }

    #[test]
    fn test_matches_simple() {
        assert!(simple("a", Operator::Gt, Value::Int(1)).matches(&lookup));
        assert!(simple("a", Operator::Gte, Value::Int(2)).matches(&lookup));
        assert!(!simple("a", Operator::Lt, Value::Int(2)).matches(&lookup));
        assert!(simple("a", Operator::Lte, Value::Float(2.5)).matches(&lookup));
    }

    #[test]
    fn test_matches_missing_or_incomparable() {
        assert!(!simple("zzz", Operator::Eq, Value::Int(2)).matches(&lookup));
        assert!(!simple("a", Operator::Eq, Value::Text("2".into())).matches(&lookup));
    }

    #[test]
    fn test_matches_compound() {
        let expr = or(vec![
            simple("a", Operator::Gt, Value::Int(5)),
            and(vec![
                simple("a", Operator::Eq, Value::Int(2)),
                simple("b", Operator::Gt, Value::Text("k".into())),
            ]),
        ]);
        assert!(expr.matches(&lookup));
        assert_eq!(expr.param_count(), 3);
    }

    #[test]
    fn test_parse_sort_string() {
        let fields = SortField::parse_sort_string("-timestamp, group,,+reading");
        assert_eq!(
            fields,
            vec![
                SortField::desc("timestamp"),
                SortField::asc("group"),
                SortField::asc("reading"),
            ]
        );
        assert_eq!(fields[0].to_string(), "-timestamp");
    }

    #[test]
    fn test_effective_direction() {
        assert_eq!(CursorDirection::Forward.effective(SortDir::Desc), SortDir::Desc);
        assert_eq!(CursorDirection::Backward.effective(SortDir::Desc), SortDir::Asc);
        assert_eq!(CursorDirection::Backward.effective(SortDir::Asc), SortDir::Desc);
    }

    #[test]
    fn test_value_kind_from_str() {
        assert_eq!("timestamp".parse::<ValueKind>(), Ok(ValueKind::Timestamp));
        assert_eq!("Integer".parse::<ValueKind>(), Ok(ValueKind::Int));
        assert!("blob".parse::<ValueKind>().is_err());
    }

    #[test]
    fn test_value_ordering_across_numeric_variants() {
        assert!(Value::Int(1) < Value::Float(1.5));
        assert_eq!(Value::Text("a".into()).partial_cmp(&Value::Int(1)), None);
    }
}
