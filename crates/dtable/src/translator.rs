//! The request-to-query pipeline.
//!
//! # Pipeline
//!
//! ```text
//! base query ── clone
//!   → COUNT           records_total
//!   → GENERIC SEARCH  and (c1 like %t% or c2 like %t% or (filter c3) ...)
//!   → COLUMN SEARCH   and (c1 like %v1% and (filter c2) ...)
//!   → COUNT           records_filtered
//!   → ORDER           order by c_i dir, ... in request order
//!   → PAGINATE        offset start, limit length (-1 = unlimited)
//!   → FETCH           rows
//! ```
//!
//! The base query is only borrowed; every call works on its own clone, so a
//! translator and its base query can be reused and shared freely.

use crate::error::{Result, TableError};
use crate::filters::FilterRegistry;
use crate::mapping::ColumnMapping;
use crate::params::RequestParameters;
use crate::query::{Boolean, Condition, TableQuery};

/// The outcome of one pipeline run, before transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation<R> {
    /// Row count before any search predicate.
    pub records_total: u64,
    /// Row count after search predicates, before ordering and paging.
    pub records_filtered: u64,
    /// The fetched page.
    pub rows: Vec<R>,
}

/// Applies request parameters to a query.
pub struct QueryTranslator<'a, Q> {
    columns: &'a ColumnMapping,
    filters: &'a FilterRegistry<Q>,
}

impl<'a, Q: TableQuery> QueryTranslator<'a, Q> {
    pub fn new(columns: &'a ColumnMapping, filters: &'a FilterRegistry<Q>) -> Self {
        QueryTranslator { columns, filters }
    }

    /// Runs the full pipeline against a clone of `base`.
    pub fn run(&self, base: &Q, params: &RequestParameters) -> Result<Translation<Q::Row>> {
        let mut query = base.clone();

        let records_total = query.count().map_err(TableError::query)?;

        self.apply_search(&mut query, params);

        let records_filtered = query.count().map_err(TableError::query)?;

        self.apply_ordering(&mut query, params);
        self.apply_pagination(&mut query, params);

        let rows = query.fetch().map_err(TableError::query)?;

        tracing::debug!(
            records_total,
            records_filtered,
            rows = rows.len(),
            "table query translated"
        );

        Ok(Translation {
            records_total,
            records_filtered,
            rows,
        })
    }

    /// Renders the query `run` would fetch with, without counting or fetching.
    pub fn to_query_text(&self, base: &Q, params: &RequestParameters) -> String {
        let mut query = base.clone();
        self.apply_search(&mut query, params);
        self.apply_ordering(&mut query, params);
        self.apply_pagination(&mut query, params);
        query.to_query_text()
    }

    /// Applies generic search, then column search.
    pub fn apply_search(&self, query: &mut Q, params: &RequestParameters) {
        self.apply_generic_search(query, params);
        self.apply_column_search(query, params);
    }

    /// One OR group across every searchable column, matching the global term.
    ///
    /// Skipped when the term is empty or no columns were sent: the columns
    /// are the only source of what to search.
    fn apply_generic_search(&self, query: &mut Q, params: &RequestParameters) {
        let term = params.search_term();
        if term.is_empty() || !params.has_columns() {
            return;
        }

        query.and_where_group(|group| {
            for column in params.columns.iter().filter(|c| c.searchable) {
                let logical = column.data.as_str();
                let mapped = self.columns.resolve(logical);

                match self.filters.get(logical) {
                    Some(filter) => {
                        tracing::trace!(
                            field = logical,
                            context = "or",
                            "dispatching custom filter"
                        );
                        group.or_where_group(|scope| filter(scope, mapped, term, true));
                    }
                    None => group.push_condition(Boolean::Or, Condition::contains(mapped, term)),
                }
            }
        });
    }

    /// One AND group of the per-column search values.
    fn apply_column_search(&self, query: &mut Q, params: &RequestParameters) {
        if !params.has_columns() {
            return;
        }

        query.and_where_group(|group| {
            for column in params.columns.iter() {
                if !column.searchable || column.search.is_empty() {
                    continue;
                }
                let value = column.search_value();

                let logical = column.data.as_str();
                let mapped = self.columns.resolve(logical);

                match self.filters.get(logical) {
                    Some(filter) => {
                        tracing::trace!(
                            field = logical,
                            context = "and",
                            "dispatching custom filter"
                        );
                        group.and_where_group(|scope| filter(scope, mapped, value, false));
                    }
                    None => group.push_condition(Boolean::And, Condition::contains(mapped, value)),
                }
            }
        });
    }

    /// Appends order clauses in request order, skipping entries that point at
    /// a missing or non-orderable column.
    pub fn apply_ordering(&self, query: &mut Q, params: &RequestParameters) {
        for entry in &params.order {
            let column = match entry.column.and_then(|index| params.column(index)) {
                Some(column) if column.orderable => column,
                Some(_) => {
                    tracing::trace!(index = ?entry.column, "skipping non-orderable column");
                    continue;
                }
                None => {
                    tracing::trace!(index = ?entry.column, "skipping unknown column");
                    continue;
                }
            };

            query.order_by(self.columns.resolve(&column.data), entry.dir);
        }
    }

    /// Applies `start` and `length`. A negative length means no limit.
    pub fn apply_pagination(&self, query: &mut Q, params: &RequestParameters) {
        if let Some(start) = params.start {
            query.skip(start);
        }
        if let Some(length) = params.length {
            if length >= 0 {
                query.take(length as u64);
            }
        }
    }
}
