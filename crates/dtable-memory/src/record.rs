//! Row access.

use serde_json::Value as Json;

use crate::value::Cell;

/// A row that [`MemoryQuery`](crate::MemoryQuery) can filter and sort.
///
/// `column` is the physical name the translator produced, after column
/// mapping. Unknown columns should read as [`Cell::Null`].
///
/// # Manual Implementation
///
/// ```
/// use dtable_memory::{Cell, Number, Record};
///
/// #[derive(Clone)]
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// impl Record for User {
///     fn field(&self, column: &str) -> Cell<'_> {
///         match column {
///             "name" => Cell::String(&self.name),
///             "age" => Cell::Number(Number::I64(self.age)),
///             _ => Cell::Null,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of `column` in this row.
    fn field(&self, column: &str) -> Cell<'_>;
}

/// JSON objects resolve a column by its literal key first, then as a dotted
/// path into nested objects (`"profile.city"`).
impl Record for Json {
    fn field(&self, column: &str) -> Cell<'_> {
        if let Some(value) = self.get(column) {
            return Cell::from_json(value);
        }

        let mut current = self;
        for segment in column.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Cell::Null,
            }
        }
        Cell::from_json(current)
    }
}
