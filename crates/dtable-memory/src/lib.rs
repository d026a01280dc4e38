//! dtable-memory - In-memory query backend for dtable.
//!
//! [`MemoryQuery`] implements [`dtable::TableQuery`] over a shared vector of
//! rows, so a table endpoint can be served (or tested) without a database.
//! Rows are anything implementing [`Record`]; `serde_json::Value` works out
//! of the box.
//!
//! # Quick Start
//!
//! ```rust
//! use dtable::{ColumnParam, DataTable, Dir, RequestParameters};
//! use dtable_memory::MemoryQuery;
//! use serde_json::json;
//!
//! let rows = vec![
//!     json!({"name": "Ann", "city": "Oslo"}),
//!     json!({"name": "Bob", "city": "Lima"}),
//!     json!({"name": "Cid", "city": "Oslo"}),
//! ];
//!
//! let params = RequestParameters::new()
//!     .with_draw(1)
//!     .with_search("oslo")
//!     .with_column(ColumnParam::new("name").searchable(true).orderable(true))
//!     .with_column(ColumnParam::new("city").searchable(true))
//!     .with_order(0, Dir::Desc)
//!     .with_length(10);
//!
//! let envelope = DataTable::builder(params)
//!     .query(MemoryQuery::new("people", rows))
//!     .response()
//!     .unwrap();
//!
//! assert_eq!(envelope.records_total, 3);
//! assert_eq!(envelope.records_filtered, 2);
//! assert_eq!(envelope.data[0]["name"], "Cid");
//! ```
//!
//! # Semantics
//!
//! Predicates follow SQL rules where they make sense for in-memory data:
//!
//! - **AND before OR**: `a and b or c` is `(a and b) or c`; nested groups
//!   evaluate as a unit.
//! - **LIKE**: case-insensitive, `%` matches any run and `_` one character.
//!   Numbers and booleans match on their text form.
//! - **Comparisons**: numeric across integers and floats; text compared with
//!   a number is parsed as a number.
//! - **Nulls**: never satisfy a predicate, and sort after every value.
//!
//! | Cell | `=` `<>` `<` `<=` `>` `>=` | `like` `not like` |
//! |------|---------------------------|-------------------|
//! | String | text, or numeric against a number | yes |
//! | Number | numeric | on text form |
//! | Bool | as 0/1 against a number | on `true`/`false` |
//! | Null | never | never |

mod clause;
mod error;
mod ordering;
mod query;
mod record;
mod value;

pub use error::{MemoryError, Result};
pub use ordering::{compare_by_orderings, compare_cells, sort_cells, OrderBy};
pub use query::MemoryQuery;
pub use record::Record;
pub use value::{Cell, Number};
