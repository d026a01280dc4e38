//! Logical to physical column names.
//!
//! The client addresses columns by the names it renders (`columns[i].data`);
//! the query may need a qualified expression instead (`users.name`,
//! `CONCAT(first, ' ', last)`). Unmapped names pass through unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Dictionary from logical column name to physical query expression.
///
/// ```
/// use dtable::ColumnMapping;
///
/// let mapping = ColumnMapping::new().with("name", "users.name");
/// assert_eq!(mapping.resolve("name"), "users.name");
/// assert_eq!(mapping.resolve("email"), "email");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: HashMap<String, String>,
}

impl ColumnMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping, chaining.
    pub fn with(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.insert(logical, physical);
        self
    }

    /// Adds or replaces a mapping.
    pub fn insert(&mut self, logical: impl Into<String>, physical: impl Into<String>) {
        self.columns.insert(logical.into(), physical.into());
    }

    /// Returns the physical expression for `logical`, or `logical` itself.
    pub fn resolve<'a>(&'a self, logical: &'a str) -> &'a str {
        self.columns.get(logical).map_or(logical, String::as_str)
    }

    /// Returns the explicit mapping for `logical`, if any.
    pub fn get(&self, logical: &str) -> Option<&str> {
        self.columns.get(logical).map(String::as_str)
    }

    /// Number of mapped columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if no column is mapped.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(logical, physical)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = ColumnMapping::new();
        mapping.extend(iter);
        mapping
    }
}

impl<K, V> Extend<(K, V)> for ColumnMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (logical, physical) in iter {
            self.insert(logical, physical);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_fallback() {
        let mapping = ColumnMapping::new();
        assert_eq!(mapping.resolve("anything"), "anything");
        assert_eq!(mapping.get("anything"), None);
    }

    #[test]
    fn later_insert_wins() {
        let mapping = ColumnMapping::new()
            .with("name", "a.name")
            .with("name", "b.name");
        assert_eq!(mapping.resolve("name"), "b.name");
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn collects_from_pairs() {
        let mapping: ColumnMapping = [("name", "users.name"), ("city", "addresses.city")]
            .into_iter()
            .collect();
        assert_eq!(mapping.resolve("city"), "addresses.city");
        assert!(!mapping.is_empty());
    }

    #[test]
    fn loads_from_config_data() {
        let mapping: ColumnMapping =
            serde_json::from_value(json!({"created": "posts.created_at"})).unwrap();
        assert_eq!(mapping.resolve("created"), "posts.created_at");
        assert_eq!(
            serde_json::to_value(&mapping).unwrap(),
            json!({"created": "posts.created_at"})
        );
    }
}
