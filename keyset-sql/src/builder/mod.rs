//! Predicate tree and parameterized SQL generation.

mod filter;
mod select;
mod types;

// Re-export all public items
pub use select::QueryBuilder;
pub use types::{
    CompoundFilter, CursorDirection, Filter, FilterExpr, LogicalOp, Operator, QueryResult,
    SortDir, SortField, Value, ValueKind, and, or, simple,
};
