//! dtable - Server-side request translation for DataTables-style list endpoints.
//!
//! A table widget asks for one page of rows at a time and describes what it
//! wants as a set of request parameters: a global search term, per-column
//! search values, order entries and a window (`start`, `length`). dtable
//! turns those parameters into predicates, orderings and limits on a
//! [`TableQuery`], runs it, and wraps the page in the response envelope the
//! widget expects:
//!
//! ```text
//! {"draw": 3, "recordsTotal": 57, "recordsFiltered": 12, "data": [...]}
//! ```
//!
//! It supports:
//!
//! - Generic search across every searchable column (OR group)
//! - Per-column search values (AND group)
//! - Logical to physical column mapping
//! - Per-column custom filters that replace the default `LIKE` predicate
//! - Multi-column ordering and windowing, with `length = -1` for "all rows"
//! - Post-fetch `each` and `map` row hooks
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dtable::{DataTable, RequestParameters};
//! use dtable_memory::MemoryQuery;
//!
//! let params: RequestParameters = serde_json::from_str(request_body)?;
//!
//! let body = DataTable::builder(params)
//!     .query(MemoryQuery::new("users", rows))
//!     .column("name", "profile.name")
//!     .to_json()?;
//! ```
//!
//! # Pipeline
//!
//! Each evaluation starts from a clone of the base query, which is never
//! modified:
//!
//! ```text
//! count (recordsTotal) → search → count (recordsFiltered)
//!   → order → window → fetch → each → map → envelope
//! ```
//!
//! Storage is pluggable through [`TableQuery`]. The `dtable-memory` crate
//! implements it over in-memory JSON rows.

mod envelope;
mod error;
mod filters;
mod mapping;
mod params;
mod query;
mod table;
mod transform;
mod translator;

#[cfg(test)]
mod testing;

pub use envelope::ResponseEnvelope;
pub use error::{Result, TableError};
pub use filters::{shorthand_field, FilterFn, FilterRegistry};
pub use mapping::ColumnMapping;
pub use params::{ColumnParam, OrderParam, RequestParameters, Search};
pub use query::{Boolean, Condition, Dir, Op, TableQuery};
pub use table::{DataTable, DataTableBuilder};
pub use transform::{EachFn, MapFn, ResultTransformer};
pub use translator::{QueryTranslator, Translation};
