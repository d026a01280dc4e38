//! The in-memory [`TableQuery`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use dtable::{Boolean, Condition, Dir, TableQuery};

use crate::clause::{first_error, matches_terms, render_terms, Clause, Node, Term};
use crate::error::MemoryError;
use crate::ordering::{compare_by_orderings, OrderBy};
use crate::record::Record;

/// A query over a shared, immutable set of rows.
///
/// Rows live behind an [`Arc`], so cloning a query (which the translator does
/// once per evaluation) copies only the composed predicates.
///
/// # Example
///
/// ```
/// use dtable::{Op, TableQuery};
/// use dtable_memory::MemoryQuery;
/// use serde_json::json;
///
/// let mut query = MemoryQuery::new("users", vec![
///     json!({"name": "Ann", "age": 31}),
///     json!({"name": "Bob", "age": 25}),
/// ]);
/// query.and_where("age", Op::Gt, 30);
///
/// assert_eq!(query.count().unwrap(), 1);
/// assert_eq!(query.to_query_text(), "select * from users where age > ?");
/// ```
pub struct MemoryQuery<R> {
    table: String,
    rows: Arc<Vec<R>>,
    wheres: Vec<Term>,
    orders: Vec<OrderBy>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl<R> MemoryQuery<R> {
    /// Creates a query over `rows`, named `table` in the rendered text.
    pub fn new(table: impl Into<String>, rows: Vec<R>) -> Self {
        Self::from_arc(table, Arc::new(rows))
    }

    /// Creates a query over rows that are already shared.
    pub fn from_arc(table: impl Into<String>, rows: Arc<Vec<R>>) -> Self {
        MemoryQuery {
            table: table.into(),
            rows,
            wheres: Vec::new(),
            orders: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// The table name used in the rendered text.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All rows, before any predicate.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// The values bound to the `?` placeholders of
    /// [`to_query_text`](TableQuery::to_query_text), in order.
    pub fn bindings(&self) -> Vec<Json> {
        let mut sql = String::new();
        let mut bindings = Vec::new();
        render_terms(&self.wheres, &mut sql, &mut bindings);
        bindings
    }

    /// Returns `true` if no predicate has been pushed.
    pub fn is_unfiltered(&self) -> bool {
        self.wheres.is_empty()
    }

    /// Orderings in the order they were added.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orders
    }

    /// The offset set by [`TableQuery::skip`].
    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    /// The limit set by [`TableQuery::take`].
    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    fn check(&self) -> Result<(), MemoryError> {
        match first_error(&self.wheres) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl<R: Record> MemoryQuery<R> {
    fn matching(&self) -> impl Iterator<Item = &R> {
        self.rows
            .iter()
            .filter(move |row| matches_terms(&self.wheres, *row))
    }
}

impl<R: Record + Clone> TableQuery for MemoryQuery<R> {
    type Row = R;
    type Error = MemoryError;

    fn push_condition(&mut self, boolean: Boolean, condition: Condition) {
        self.wheres
            .push((boolean, Node::Clause(Clause::new(condition))));
    }

    fn nested(&self) -> Self {
        MemoryQuery::from_arc(self.table.clone(), Arc::clone(&self.rows))
    }

    fn push_nested(&mut self, boolean: Boolean, nested: Self) {
        if nested.wheres.is_empty() {
            return;
        }
        self.wheres.push((boolean, Node::Group(nested.wheres)));
    }

    fn order_by(&mut self, column: &str, dir: Dir) {
        self.orders.push(OrderBy::new(column, dir));
    }

    fn skip(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    fn take(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    fn count(&self) -> Result<u64, MemoryError> {
        self.check()?;
        let count = self.matching().count() as u64;
        tracing::trace!(table = %self.table, count, "counted rows");
        Ok(count)
    }

    fn fetch(&self) -> Result<Vec<R>, MemoryError> {
        self.check()?;

        let mut rows: Vec<&R> = self.matching().collect();
        if !self.orders.is_empty() {
            rows.sort_by(|a, b| compare_by_orderings(*a, *b, &self.orders));
        }

        let offset = usize::try_from(self.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = match self.limit {
            Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
            None => usize::MAX,
        };

        let page: Vec<R> = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        tracing::trace!(table = %self.table, rows = page.len(), "fetched rows");
        Ok(page)
    }

    fn to_query_text(&self) -> String {
        let mut sql = format!("select * from {}", self.table);

        if !self.wheres.is_empty() {
            sql.push_str(" where ");
            render_terms(&self.wheres, &mut sql, &mut Vec::new());
        }

        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|o| format!("{} {}", o.column, o.dir))
                .collect();
            sql.push_str(" order by ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" limit {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" offset {offset}"));
        }

        sql
    }
}

impl<R> Clone for MemoryQuery<R> {
    fn clone(&self) -> Self {
        MemoryQuery {
            table: self.table.clone(),
            rows: Arc::clone(&self.rows),
            wheres: self.wheres.clone(),
            orders: self.orders.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }
}

impl<R> fmt::Debug for MemoryQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQuery")
            .field("table", &self.table)
            .field("rows", &self.rows.len())
            .field("wheres", &self.wheres.len())
            .field("orders", &self.orders)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtable::Op;
    use serde_json::json;

    fn names(rows: &[Json]) -> Vec<&str> {
        rows.iter().filter_map(|r| r["name"].as_str()).collect()
    }

    fn sample() -> MemoryQuery<Json> {
        MemoryQuery::new(
            "users",
            vec![
                json!({"name": "Ann", "age": 31, "city": "Oslo"}),
                json!({"name": "bob", "age": 25, "city": null}),
                json!({"name": "Cid", "age": 40, "city": "Lima"}),
                json!({"name": "Dee", "age": 25, "city": "Oslo"}),
            ],
        )
    }

    #[test]
    fn empty_query_matches_all() {
        let query = sample();
        assert_eq!(query.count().unwrap(), 4);
        assert_eq!(query.fetch().unwrap().len(), 4);
        assert!(query.is_unfiltered());
    }

    #[test]
    fn like_is_case_insensitive() {
        let mut query = sample();
        query.and_where("name", Op::Like, "%B%");
        assert_eq!(names(&query.fetch().unwrap()), vec!["bob"]);
    }

    #[test]
    fn nested_groups() {
        let mut query = sample();
        query
            .and_where("city", Op::Eq, "Oslo")
            .and_where_group(|g| {
                g.or_where("age", Op::Lt, 30).or_where("name", Op::Eq, "Ann");
            });

        assert_eq!(names(&query.fetch().unwrap()), vec!["Ann", "Dee"]);
        assert_eq!(
            query.to_query_text(),
            "select * from users where city = ? and (age < ? or name = ?)"
        );
        assert_eq!(query.bindings(), vec![json!("Oslo"), json!(30), json!("Ann")]);
    }

    #[test]
    fn empty_nested_group_is_ignored() {
        let mut query = sample();
        query.and_where_group(|_| {});
        assert!(query.is_unfiltered());
        assert_eq!(query.to_query_text(), "select * from users");
    }

    #[test]
    fn stable_multi_key_sort_with_nulls_last() {
        let mut query = sample();
        query.order_by("age", Dir::Asc);
        assert_eq!(
            names(&query.fetch().unwrap()),
            vec!["bob", "Dee", "Ann", "Cid"]
        );

        let mut query = sample();
        query.order_by("city", Dir::Asc);
        query.order_by("name", Dir::Desc);
        assert_eq!(
            names(&query.fetch().unwrap()),
            vec!["Cid", "Dee", "Ann", "bob"]
        );
    }

    #[test]
    fn count_ignores_window() {
        let mut query = sample();
        query.skip(1);
        query.take(2);
        assert_eq!(query.count().unwrap(), 4);
        assert_eq!(names(&query.fetch().unwrap()), vec!["bob", "Cid"]);
        assert_eq!(query.get_offset(), Some(1));
        assert_eq!(query.get_limit(), Some(2));
    }

    #[test]
    fn offset_beyond_results() {
        let mut query = sample();
        query.skip(100);
        assert!(query.fetch().unwrap().is_empty());
    }

    #[test]
    fn full_query_text() {
        let mut query = sample();
        query.and_where("age", Op::Gte, 25);
        query.order_by("name", Dir::Desc);
        query.order_by("age", Dir::Asc);
        query.take(10);
        query.skip(20);

        assert_eq!(
            query.to_query_text(),
            "select * from users where age >= ? order by name desc, age asc limit 10 offset 20"
        );
    }

    #[test]
    fn clones_share_rows_not_predicates() {
        let base = sample();
        let mut narrowed = base.clone();
        narrowed.and_where("age", Op::Eq, 25);

        assert_eq!(narrowed.count().unwrap(), 2);
        assert_eq!(base.count().unwrap(), 4);
        assert!(Arc::ptr_eq(&base.rows, &narrowed.rows));
    }

    #[test]
    fn nested_scope_starts_empty() {
        let mut base = sample();
        base.and_where("age", Op::Eq, 25);
        base.order_by("name", Dir::Asc);

        let scope = base.nested();
        assert!(scope.is_unfiltered());
        assert!(scope.orderings().is_empty());
        assert_eq!(scope.table(), "users");
        assert_eq!(scope.rows().len(), 4);
    }

    #[test]
    fn debug_summarizes() {
        let text = format!("{:?}", sample());
        assert!(text.contains("table: \"users\""));
        assert!(text.contains("rows: 4"));
    }
}
