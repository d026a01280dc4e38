//! Error types for the memory backend.

use thiserror::Error;

/// Longest pattern prefix quoted in an error message.
const PATTERN_PREVIEW: usize = 64;

/// Errors surfaced by [`MemoryQuery::count`](dtable::TableQuery::count) and
/// [`MemoryQuery::fetch`](dtable::TableQuery::fetch).
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    /// A `LIKE` pattern could not be compiled.
    #[error("invalid like pattern {}: {source}", preview(.pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Quotes at most [`PATTERN_PREVIEW`] characters of `pattern`.
fn preview(pattern: &str) -> String {
    let total = pattern.chars().count();
    if total <= PATTERN_PREVIEW {
        return format!("{pattern:?}");
    }
    let head: String = pattern.chars().take(PATTERN_PREVIEW).collect();
    format!("{head:?}... ({total} chars)")
}

/// Result type for memory backend operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
