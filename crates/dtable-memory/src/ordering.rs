//! Cell comparison for predicates and sorting.

use std::cmp::Ordering;

use dtable::Dir;

use crate::record::Record;
use crate::value::{Cell, Number};

/// A single ordering clause specifying a column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The column to sort by.
    pub column: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            column: column.into(),
            dir,
        }
    }

    /// Compares two rows on this clause's column.
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        self.dir
            .apply(sort_cells(a.field(&self.column), b.field(&self.column)))
    }
}

/// Compares two cells for a predicate.
///
/// Returns `None` when either side is null or a string side does not parse
/// as the number it is compared with. Booleans compare with numbers as 0/1.
pub fn compare_cells(a: Cell<'_>, b: Cell<'_>) -> Option<Ordering> {
    match (a, b) {
        (Cell::Null, _) | (_, Cell::Null) => None,

        (Cell::String(x), Cell::String(y)) => Some(x.cmp(y)),
        (Cell::Bool(x), Cell::Bool(y)) => Some(x.cmp(&y)),
        (Cell::Number(x), Cell::Number(y)) => x.compare(y),

        (Cell::Number(x), Cell::String(_)) => x.compare(b.as_number()?),
        (Cell::String(_), Cell::Number(y)) => a.as_number()?.compare(y),

        (Cell::Bool(x), Cell::Number(y)) => Number::I64(x as i64).compare(y),
        (Cell::Number(x), Cell::Bool(y)) => x.compare(Number::I64(y as i64)),

        (Cell::Bool(_), Cell::String(_)) | (Cell::String(_), Cell::Bool(_)) => {
            Some(a.text()?.cmp(&b.text()?))
        }
    }
}

/// Compares two cells for sorting, ascending.
///
/// Nulls sort after every value. Pairs that cannot be compared
/// (NaN, text that is not a number) fall back to their text forms.
pub fn sort_cells(a: Cell<'_>, b: Cell<'_>) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare_cells(a, b)
            .or_else(|| Some(a.text()?.cmp(&b.text()?)))
            .unwrap_or(Ordering::Equal),
    }
}

/// Compares two rows using a list of ordering clauses.
///
/// Uses the first clause as the primary sort key, the second to break ties, etc.
pub fn compare_by_orderings<R: Record>(a: &R, b: &R, orderings: &[OrderBy]) -> Ordering {
    orderings
        .iter()
        .map(|order_by| order_by.compare(a, b))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
