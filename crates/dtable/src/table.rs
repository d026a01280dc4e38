//! DataTable configuration and evaluation.
//!
//! A [`DataTableBuilder`] accumulates the base query, column mapping, filters
//! and row hooks; [`build`](DataTableBuilder::build) turns them into an
//! immutable [`DataTable`] that can be evaluated any number of times.
//!
//! ```rust,ignore
//! use dtable::{DataTable, Op, TableQuery};
//!
//! let table = DataTable::builder(params)
//!     .query(base_query)
//!     .column("name", "users.name")
//!     .filter("age", |scope: &mut MyQuery, column: &str, term: &str, _or: bool| {
//!         if let Ok(age) = term.parse::<i64>() {
//!             scope.and_where(column, Op::Eq, age);
//!         }
//!     })
//!     .map(|row, _index| decorate(row))
//!     .build()?;
//!
//! let body = table.to_json()?;
//! ```
//!
//! Every terminal (`response`, `to_json`, `to_query_text`, `translate`) runs
//! the pipeline again from a fresh clone of the base query; nothing is cached
//! between calls.

use std::fmt;

use serde::Serialize;

use crate::envelope::ResponseEnvelope;
use crate::error::{Result, TableError};
use crate::filters::{shorthand_field, FilterFn, FilterRegistry};
use crate::mapping::ColumnMapping;
use crate::params::RequestParameters;
use crate::query::TableQuery;
use crate::transform::ResultTransformer;
use crate::translator::{QueryTranslator, Translation};

/// A fully configured, immutable table endpoint.
pub struct DataTable<Q: TableQuery> {
    params: RequestParameters,
    query: Q,
    columns: ColumnMapping,
    filters: FilterRegistry<Q>,
    transformer: ResultTransformer<Q::Row>,
}

impl<Q: TableQuery> DataTable<Q> {
    /// Starts configuring a table for one request.
    pub fn builder(params: RequestParameters) -> DataTableBuilder<Q> {
        DataTableBuilder::new(params)
    }

    fn translator(&self) -> QueryTranslator<'_, Q> {
        QueryTranslator::new(&self.columns, &self.filters)
    }

    /// Runs the pipeline and returns counts and raw rows, untransformed.
    pub fn translate(&self) -> Result<Translation<Q::Row>> {
        self.translator().run(&self.query, &self.params)
    }

    /// Runs the pipeline, applies the row hooks and builds the envelope.
    pub fn response(&self) -> Result<ResponseEnvelope<Q::Row>> {
        let mut translation = self.translate()?;
        translation.rows = self.transformer.apply(translation.rows);
        Ok(ResponseEnvelope::new(self.params.draw_token(), translation))
    }

    /// Renders the composed query without counting or fetching.
    pub fn to_query_text(&self) -> String {
        self.translator().to_query_text(&self.query, &self.params)
    }

    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    pub fn base_query(&self) -> &Q {
        &self.query
    }

    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    pub fn filters(&self) -> &FilterRegistry<Q> {
        &self.filters
    }
}

impl<Q> DataTable<Q>
where
    Q: TableQuery,
    Q::Row: Serialize,
{
    /// Runs the pipeline and serializes the envelope.
    pub fn to_json(&self) -> Result<String> {
        self.response()?.to_json()
    }
}

impl<Q: TableQuery + fmt::Debug> fmt::Debug for DataTable<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("params", &self.params)
            .field("query", &self.query)
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("transformer", &self.transformer)
            .finish()
    }
}

/// Builder for [`DataTable`].
pub struct DataTableBuilder<Q: TableQuery> {
    params: RequestParameters,
    query: Option<Q>,
    columns: ColumnMapping,
    filters: FilterRegistry<Q>,
    transformer: ResultTransformer<Q::Row>,
}

impl<Q: TableQuery> DataTableBuilder<Q> {
    pub fn new(params: RequestParameters) -> Self {
        DataTableBuilder {
            params,
            query: None,
            columns: ColumnMapping::new(),
            filters: FilterRegistry::new(),
            transformer: ResultTransformer::new(),
        }
    }

    /// Sets the base query. Required.
    pub fn query(mut self, query: Q) -> Self {
        self.query = Some(query);
        self
    }

    /// Replaces the column mapping.
    pub fn columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Maps one logical column to a physical expression.
    pub fn column(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.columns.insert(logical, physical);
        self
    }

    /// Registers a filter for a logical column.
    pub fn filter<F>(mut self, field: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&mut Q, &str, &str, bool) + Send + Sync + 'static,
    {
        self.filters.register(field, filter);
        self
    }

    /// Registers several filters. Later entries override earlier ones.
    pub fn filters<I, K>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, FilterFn<Q>)>,
        K: Into<String>,
    {
        self.filters.register_many(filters);
        self
    }

    /// Registers a filter through a `filter<Name>` shorthand name.
    ///
    /// `dispatch("filterCreatedAt", f)` is `filter("created_at", f)`. Any
    /// other name fails with [`TableError::MethodNotFound`].
    pub fn dispatch<F>(self, method: &str, filter: F) -> Result<Self>
    where
        F: Fn(&mut Q, &str, &str, bool) + Send + Sync + 'static,
    {
        match shorthand_field(method) {
            Some(field) => Ok(self.filter(field, filter)),
            None => Err(TableError::MethodNotFound {
                method: method.to_string(),
            }),
        }
    }

    /// Sets the in-place row hook.
    pub fn each<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Q::Row) + Send + Sync + 'static,
    {
        self.transformer = self.transformer.each(f);
        self
    }

    /// Sets the row-replacing hook.
    pub fn map<F>(mut self, f: F) -> Self
    where
        F: Fn(Q::Row, usize) -> Q::Row + Send + Sync + 'static,
    {
        self.transformer = self.transformer.map(f);
        self
    }

    /// Finalizes the configuration.
    ///
    /// Fails with [`TableError::MissingQuery`] if no base query was set.
    pub fn build(self) -> Result<DataTable<Q>> {
        let query = self.query.ok_or(TableError::MissingQuery)?;
        Ok(DataTable {
            params: self.params,
            query,
            columns: self.columns,
            filters: self.filters,
            transformer: self.transformer,
        })
    }

    /// Builds and evaluates in one step.
    pub fn response(self) -> Result<ResponseEnvelope<Q::Row>> {
        self.build()?.response()
    }

    /// Builds and renders the composed query.
    pub fn to_query_text(self) -> Result<String> {
        Ok(self.build()?.to_query_text())
    }
}

impl<Q> DataTableBuilder<Q>
where
    Q: TableQuery,
    Q::Row: Serialize,
{
    /// Builds, evaluates and serializes in one step.
    pub fn to_json(self) -> Result<String> {
        self.build()?.to_json()
    }
}
