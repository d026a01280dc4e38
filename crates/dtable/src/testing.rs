//! A recording [`TableQuery`] double for unit tests.

use thiserror::Error;

use crate::query::{Boolean, Condition, Dir, TableQuery};

#[derive(Debug, Error)]
#[error("backend unavailable")]
pub struct Unavailable;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Condition(Boolean, Condition),
    Nested(Boolean, Vec<Call>),
    OrderBy(String, Dir),
    Skip(u64),
    Take(u64),
}

/// Records every builder call. `count` pretends each top-level predicate
/// removes one row; `fetch` returns `row{i}` strings for the resulting page.
#[derive(Debug, Clone, Default)]
pub struct RecordingQuery {
    pub rows: u64,
    pub calls: Vec<Call>,
    pub fail: bool,
}

impl RecordingQuery {
    pub fn with_rows(rows: u64) -> Self {
        RecordingQuery {
            rows,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        RecordingQuery {
            fail: true,
            ..Default::default()
        }
    }

    fn predicates(&self) -> u64 {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Condition(..) | Call::Nested(..)))
            .count() as u64
    }

    fn render(calls: &[Call]) -> String {
        calls
            .iter()
            .map(|call| match call {
                Call::Condition(b, c) => format!("{b} {} {} {}", c.column, c.op, c.value),
                Call::Nested(b, inner) => format!("{b}({})", Self::render(inner)),
                Call::OrderBy(column, dir) => format!("order {column} {dir}"),
                Call::Skip(n) => format!("skip {n}"),
                Call::Take(n) => format!("take {n}"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TableQuery for RecordingQuery {
    type Row = String;
    type Error = Unavailable;

    fn push_condition(&mut self, boolean: Boolean, condition: Condition) {
        self.calls.push(Call::Condition(boolean, condition));
    }

    fn nested(&self) -> Self {
        RecordingQuery::with_rows(self.rows)
    }

    fn push_nested(&mut self, boolean: Boolean, nested: Self) {
        if !nested.calls.is_empty() {
            self.calls.push(Call::Nested(boolean, nested.calls));
        }
    }

    fn order_by(&mut self, column: &str, dir: Dir) {
        self.calls.push(Call::OrderBy(column.to_string(), dir));
    }

    fn skip(&mut self, offset: u64) {
        self.calls.push(Call::Skip(offset));
    }

    fn take(&mut self, limit: u64) {
        self.calls.push(Call::Take(limit));
    }

    fn count(&self) -> Result<u64, Self::Error> {
        if self.fail {
            return Err(Unavailable);
        }
        Ok(self.rows.saturating_sub(self.predicates()))
    }

    fn fetch(&self) -> Result<Vec<String>, Self::Error> {
        let mut available = self.count()?;
        for call in &self.calls {
            match call {
                Call::Skip(n) => available = available.saturating_sub(*n),
                Call::Take(n) => available = available.min(*n),
                _ => {}
            }
        }
        Ok((0..available).map(|i| format!("row{i}")).collect())
    }

    fn to_query_text(&self) -> String {
        Self::render(&self.calls)
    }
}
