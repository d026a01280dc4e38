//! The query collaborator the translator drives.
//!
//! dtable never executes anything itself. It composes predicates, orderings
//! and limits onto a [`TableQuery`], then asks that query to count and fetch.
//! Any storage layer can take part by implementing the trait; the
//! `dtable-memory` crate provides one over in-memory rows.
//!
//! # Predicate composition
//!
//! Predicates are pushed one at a time, each tagged with the [`Boolean`] that
//! joins it to the predicates before it. Nested groups are built on a fresh
//! scope obtained from [`TableQuery::nested`] and attached as a unit:
//!
//! ```text
//! base.and_where_group(|g| {
//!     g.or_where("name", Op::Like, "%ann%");
//!     g.or_where("email", Op::Like, "%ann%");
//! });
//!
//! => ... and (name like ? or email like ?)
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Dir::Asc),
            "desc" => Ok(Dir::Desc),
            other => Err(format!("invalid order direction: {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for Dir {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Comparison operator for a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL `LIKE` pattern match (`%` any run, `_` one character).
    Like,
    /// Negated `LIKE`.
    NotLike,
}

impl Op {
    /// Returns the SQL spelling of this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "like",
            Op::NotLike => "not like",
        }
    }

    /// Returns `true` for the pattern operators.
    pub fn is_pattern(self) -> bool {
        matches!(self, Op::Like | Op::NotLike)
    }

    /// Evaluates a comparison operator against an ordering result.
    ///
    /// Pattern operators never match here; they are evaluated on text.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Like | Op::NotLike => false,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// How a predicate joins the predicates before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

impl Boolean {
    /// Returns the SQL keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Boolean::And => "and",
            Boolean::Or => "or",
        }
    }
}

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single `column op value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The physical column or expression to compare.
    pub column: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: Value,
}

impl Condition {
    /// Creates a new condition.
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Condition {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Creates the default search predicate: `column LIKE '%term%'`.
    ///
    /// `%` and `_` inside the term keep their wildcard meaning.
    pub fn contains(column: impl Into<String>, term: &str) -> Self {
        Condition::new(column, Op::Like, format!("%{term}%"))
    }
}

/// A composable, cloneable query the translator can narrow, order and page.
///
/// Implementors only provide the primitive operations; the chaining helpers
/// used inside filter callbacks are provided on top of them.
pub trait TableQuery: Clone {
    /// The row type produced by [`fetch`](TableQuery::fetch).
    type Row;

    /// The error produced by [`count`](TableQuery::count) and
    /// [`fetch`](TableQuery::fetch).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Appends a predicate joined by `boolean`.
    fn push_condition(&mut self, boolean: Boolean, condition: Condition);

    /// Returns an empty scope for building a nested predicate group.
    fn nested(&self) -> Self;

    /// Appends the predicates of `nested` as one parenthesized group.
    ///
    /// A nested scope without predicates must be ignored.
    fn push_nested(&mut self, boolean: Boolean, nested: Self);

    /// Appends an ordering clause after any existing ones.
    fn order_by(&mut self, column: &str, dir: Dir);

    /// Skips the first `offset` rows.
    fn skip(&mut self, offset: u64);

    /// Returns at most `limit` rows.
    fn take(&mut self, limit: u64);

    /// Counts the rows matching the current predicates.
    fn count(&self) -> Result<u64, Self::Error>;

    /// Fetches the matching rows with ordering, offset and limit applied.
    fn fetch(&self) -> Result<Vec<Self::Row>, Self::Error>;

    /// Renders the composed query for debugging.
    fn to_query_text(&self) -> String;

    /// Adds an AND-joined predicate.
    fn and_where(&mut self, column: &str, op: Op, value: impl Into<Value>) -> &mut Self {
        self.push_condition(Boolean::And, Condition::new(column, op, value));
        self
    }

    /// Adds an OR-joined predicate.
    fn or_where(&mut self, column: &str, op: Op, value: impl Into<Value>) -> &mut Self {
        self.push_condition(Boolean::Or, Condition::new(column, op, value));
        self
    }

    /// Builds a nested group and AND-joins it.
    fn and_where_group<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let mut nested = self.nested();
        build(&mut nested);
        self.push_nested(Boolean::And, nested);
        self
    }

    /// Builds a nested group and OR-joins it.
    fn or_where_group<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let mut nested = self.nested();
        build(&mut nested);
        self.push_nested(Boolean::Or, nested);
        self
    }
}
