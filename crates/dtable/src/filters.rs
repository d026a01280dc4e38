//! Custom per-column filter callbacks.
//!
//! By default a searched column contributes `column LIKE '%term%'`. A filter
//! registered for the column's logical name replaces that entirely: it gets
//! the query scope and decides which predicates to add, if any.
//!
//! # Call signature
//!
//! ```text
//! filter(scope: &mut Q, mapped: &str, term: &str, is_or_context: bool)
//! ```
//!
//! - `scope` is a nested group of its own; predicates added with
//!   [`and_where`](crate::TableQuery::and_where) compose inside it.
//! - `mapped` is the physical column name from the [`ColumnMapping`](crate::ColumnMapping).
//! - `term` is the global search term or the column's own search value.
//! - `is_or_context` is `true` during global search, where the filter's group
//!   is OR'd with the other columns, and `false` during column search.
//!
//! ```
//! use dtable::{FilterRegistry, Op, TableQuery};
//! # fn demo<Q: TableQuery + 'static>() {
//! let mut filters = FilterRegistry::<Q>::new();
//! filters.register("age", |scope: &mut Q, column: &str, term: &str, _or: bool| {
//!     if let Ok(age) = term.parse::<i64>() {
//!         scope.and_where(column, Op::Eq, age);
//!     }
//! });
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A filter callback bound to one logical column.
pub type FilterFn<Q> = Arc<dyn Fn(&mut Q, &str, &str, bool) + Send + Sync>;

/// Dictionary from logical column name to its [`FilterFn`].
pub struct FilterRegistry<Q> {
    filters: HashMap<String, FilterFn<Q>>,
}

impl<Q> FilterRegistry<Q> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        FilterRegistry {
            filters: HashMap::new(),
        }
    }

    /// Registers a filter for `field`, replacing any earlier one.
    pub fn register<F>(&mut self, field: impl Into<String>, filter: F)
    where
        F: Fn(&mut Q, &str, &str, bool) + Send + Sync + 'static,
    {
        self.filters.insert(field.into(), Arc::new(filter));
    }

    /// Registers several filters at once. Later entries win.
    pub fn register_many<I, K>(&mut self, filters: I)
    where
        I: IntoIterator<Item = (K, FilterFn<Q>)>,
        K: Into<String>,
    {
        for (field, filter) in filters {
            self.filters.insert(field.into(), filter);
        }
    }

    /// Returns the filter registered for a logical column name.
    pub fn get(&self, field: &str) -> Option<&FilterFn<Q>> {
        self.filters.get(field)
    }

    /// Returns `true` if a filter is registered for `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.filters.contains_key(field)
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the registered field names, sorted.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }
}

impl<Q> Default for FilterRegistry<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> Clone for FilterRegistry<Q> {
    fn clone(&self) -> Self {
        FilterRegistry {
            filters: self.filters.clone(),
        }
    }
}

impl<Q> fmt::Debug for FilterRegistry<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("fields", &self.fields())
            .finish()
    }
}

/// Resolves a `filter<Name>` shorthand method name to its field.
///
/// `filterCreatedAt` becomes `created_at`. Returns `None` for names without
/// the prefix or with nothing after it.
pub fn shorthand_field(method: &str) -> Option<String> {
    let rest = method.strip_prefix("filter")?;
    if rest.is_empty() {
        return None;
    }
    Some(snake_case(rest))
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
