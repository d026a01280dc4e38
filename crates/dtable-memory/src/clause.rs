//! Compiled predicates and predicate groups.
//!
//! A [`Clause`] is a [`Condition`] ready to run against rows: `LIKE`
//! patterns are compiled once, when the condition is pushed. Clauses and
//! nested groups are stored as [`Term`]s, each tagged with the [`Boolean`]
//! that joins it to the terms before it.
//!
//! # Evaluation
//!
//! Terms evaluate with SQL precedence, AND binding tighter than OR:
//!
//! ```text
//! a and b or c and (d or e)   =>   (a ∧ b) ∨ (c ∧ (d ∨ e))
//! ```
//!
//! An empty term list matches every row.

use regex::{Regex, RegexBuilder};
use serde_json::Value as Json;

use dtable::{Boolean, Condition, Op};

use crate::error::MemoryError;
use crate::ordering::compare_cells;
use crate::record::Record;
use crate::value::Cell;

/// A predicate or a parenthesized group, joined by its boolean.
pub(crate) type Term = (Boolean, Node);

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Clause(Clause),
    Group(Vec<Term>),
}

impl Node {
    fn matches<R: Record>(&self, row: &R) -> bool {
        match self {
            Node::Clause(clause) => clause.matches(row),
            Node::Group(terms) => matches_terms(terms, row),
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Compare,
    Like(Regex),
    /// A pattern operator whose value has no text form (`null`).
    Never,
    Invalid(MemoryError),
}

/// A single compiled `column op value` predicate.
#[derive(Debug, Clone)]
pub(crate) struct Clause {
    pub column: String,
    pub op: Op,
    pub value: Json,
    matcher: Matcher,
}

impl Clause {
    pub fn new(condition: Condition) -> Self {
        let Condition { column, op, value } = condition;

        let matcher = if op.is_pattern() {
            match Cell::from_json(&value).text() {
                Some(pattern) => match like_regex(&pattern) {
                    Ok(regex) => Matcher::Like(regex),
                    Err(source) => Matcher::Invalid(MemoryError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    }),
                },
                None => Matcher::Never,
            }
        } else {
            Matcher::Compare
        };

        Clause {
            column,
            op,
            value,
            matcher,
        }
    }

    /// The compilation error, if the pattern could not be compiled.
    pub fn error(&self) -> Option<&MemoryError> {
        match &self.matcher {
            Matcher::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// Evaluates this clause against a row. Null cells never match.
    pub fn matches<R: Record>(&self, row: &R) -> bool {
        let cell = row.field(&self.column);
        match &self.matcher {
            Matcher::Compare => compare_cells(cell, Cell::from_json(&self.value))
                .is_some_and(|ordering| self.op.eval_ordering(ordering)),
            Matcher::Like(regex) => cell
                .text()
                .is_some_and(|text| regex.is_match(&text) == (self.op == Op::Like)),
            Matcher::Never | Matcher::Invalid(_) => false,
        }
    }
}

/// Evaluates a term list with AND-over-OR precedence.
pub(crate) fn matches_terms<R: Record>(terms: &[Term], row: &R) -> bool {
    let mut all = true;

    for (index, (boolean, node)) in terms.iter().enumerate() {
        if index > 0 && *boolean == Boolean::Or {
            if all {
                return true;
            }
            all = true;
        }
        all = all && node.matches(row);
    }

    all
}

/// Renders a term list with `?` placeholders, collecting bindings in order.
pub(crate) fn render_terms(terms: &[Term], sql: &mut String, bindings: &mut Vec<Json>) {
    for (index, (boolean, node)) in terms.iter().enumerate() {
        if index > 0 {
            sql.push(' ');
            sql.push_str(boolean.as_str());
            sql.push(' ');
        }
        match node {
            Node::Clause(clause) => {
                sql.push_str(&format!("{} {} ?", clause.column, clause.op.as_sql()));
                bindings.push(clause.value.clone());
            }
            Node::Group(inner) => {
                sql.push('(');
                render_terms(inner, sql, bindings);
                sql.push(')');
            }
        }
    }
}

/// Returns the first compilation error anywhere in `terms`.
pub(crate) fn first_error(terms: &[Term]) -> Option<&MemoryError> {
    terms.iter().find_map(|(_, node)| match node {
        Node::Clause(clause) => clause.error(),
        Node::Group(inner) => first_error(inner),
    })
}

/// Compiles a SQL `LIKE` pattern: `%` is any run, `_` is one character,
/// everything else is literal. Matching is case-insensitive and anchored.
pub(crate) fn like_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::with_capacity(pattern.len() + 2);
    let mut literal = String::new();

    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' | '_' => {
                source.push_str(&regex::escape(&literal));
                literal.clear();
                source.push_str(if ch == '%' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    source.push_str(&regex::escape(&literal));
    source.push('$');

    RegexBuilder::new(&source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}
