//! Error types for the dtable crate.

use thiserror::Error;

/// Errors that can occur when configuring or evaluating a data table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table was built without a base query.
    #[error("no base query configured for the data table")]
    MissingQuery,

    /// A shorthand configuration call did not match any known method.
    #[error("call to undefined method {method}()")]
    MethodNotFound { method: String },

    /// The underlying query failed while counting or fetching rows.
    #[error("query execution failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The response envelope could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TableError {
    /// Wraps a query backend error.
    pub fn query<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TableError::Query(Box::new(err))
    }
}

/// Result type for dtable operations.
pub type Result<T> = std::result::Result<T, TableError>;
