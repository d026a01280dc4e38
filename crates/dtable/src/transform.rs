//! Post-fetch row hooks.
//!
//! Two optional stages run over the fetched rows, in this order:
//!
//! ```text
//! fetched rows
//!   → EACH ← side effects, in place (decorate, log, enrich)
//!   → MAP  ← replace each row, with its zero-based position
//!   → envelope data
//! ```
//!
//! `each` visits every row before `map` sees the first one.

use std::fmt;
use std::sync::Arc;

/// Type alias for the in-place `each` stage.
pub type EachFn<R> = Arc<dyn Fn(&mut R) + Send + Sync>;

/// Type alias for the replacing `map` stage.
pub type MapFn<R> = Arc<dyn Fn(R, usize) -> R + Send + Sync>;

/// The configured post-fetch stages. Both are optional.
pub struct ResultTransformer<R> {
    each: Option<EachFn<R>>,
    map: Option<MapFn<R>>,
}

impl<R> ResultTransformer<R> {
    /// Creates a pass-through transformer.
    pub fn new() -> Self {
        ResultTransformer {
            each: None,
            map: None,
        }
    }

    /// Sets the `each` stage.
    pub fn each<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut R) + Send + Sync + 'static,
    {
        self.each = Some(Arc::new(f));
        self
    }

    /// Sets the `map` stage.
    pub fn map<F>(mut self, f: F) -> Self
    where
        F: Fn(R, usize) -> R + Send + Sync + 'static,
    {
        self.map = Some(Arc::new(f));
        self
    }

    /// Returns true if no stage is configured.
    pub fn is_empty(&self) -> bool {
        self.each.is_none() && self.map.is_none()
    }

    /// Runs the configured stages over `rows`.
    pub fn apply(&self, mut rows: Vec<R>) -> Vec<R> {
        if let Some(each) = &self.each {
            for row in rows.iter_mut() {
                each(row);
            }
        }

        match &self.map {
            Some(map) => rows
                .into_iter()
                .enumerate()
                .map(|(index, row)| map(row, index))
                .collect(),
            None => rows,
        }
    }
}

impl<R> Default for ResultTransformer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ResultTransformer<R> {
    fn clone(&self) -> Self {
        ResultTransformer {
            each: self.each.clone(),
            map: self.map.clone(),
        }
    }
}

impl<R> fmt::Debug for ResultTransformer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultTransformer")
            .field("each", &self.each.is_some())
            .field("map", &self.map.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn empty_is_pass_through() {
        let transformer = ResultTransformer::<i32>::new();
        assert!(transformer.is_empty());
        assert_eq!(transformer.apply(vec![3, 1, 2]), vec![3, 1, 2]);
    }

    #[test]
    fn each_mutates_in_place() {
        let transformer = ResultTransformer::new().each(|row: &mut String| row.push('!'));
        assert_eq!(
            transformer.apply(vec!["a".to_string(), "b".to_string()]),
            vec!["a!", "b!"]
        );
    }

    #[test]
    fn map_receives_position() {
        let transformer =
            ResultTransformer::new().map(|row: String, index| format!("{index}:{row}"));
        assert_eq!(
            transformer.apply(vec!["x".to_string(), "y".to_string()]),
            vec!["0:x", "1:y"]
        );
    }

    #[test]
    fn each_completes_before_map() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let each_log = Arc::clone(&log);
        let map_log = Arc::clone(&log);

        let transformer = ResultTransformer::new()
            .each(move |row: &mut i32| each_log.lock().unwrap().push(format!("each {row}")))
            .map(move |row: i32, index| {
                map_log.lock().unwrap().push(format!("map {index}"));
                row * 10
            });

        assert_eq!(transformer.apply(vec![1, 2]), vec![10, 20]);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["each 1", "each 2", "map 0", "map 1"]
        );
    }
}
