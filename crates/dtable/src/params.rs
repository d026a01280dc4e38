//! Request parameters of the DataTables server-side protocol.
//!
//! The client sends every value as text (`draw=3&start=20&columns[0][searchable]=true`),
//! so deserialization here is lenient: numbers may arrive as numbers or
//! numeric strings, and the per-column flags are the strings `"true"` /
//! `"false"`.
//!
//! ```
//! use dtable::RequestParameters;
//! use serde_json::json;
//!
//! let params: RequestParameters = serde_json::from_value(json!({
//!     "draw": "3",
//!     "start": "0",
//!     "length": "10",
//!     "search": { "value": "ann" },
//!     "columns": [
//!         { "data": "name", "searchable": "true", "orderable": "true", "search": { "value": "" } }
//!     ],
//!     "order": [ { "column": "0", "dir": "asc" } ]
//! }))
//! .unwrap();
//!
//! assert_eq!(params.draw, Some(3));
//! assert_eq!(params.search_term(), "ann");
//! assert!(params.columns[0].searchable);
//! ```

use serde::{Deserialize, Deserializer};

use crate::query::Dir;

/// Parsed request parameters.
///
/// A missing `columns` list and an empty one behave the same way: neither
/// search nor ordering has anything to act on.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestParameters {
    /// Client sequence token, coerced to an integer.
    #[serde(deserialize_with = "coerce::draw")]
    pub draw: Option<i64>,

    /// Number of rows to skip.
    #[serde(deserialize_with = "coerce::offset")]
    pub start: Option<u64>,

    /// Maximum number of rows; `-1` means unlimited.
    #[serde(deserialize_with = "coerce::length")]
    pub length: Option<i64>,

    /// Global search applied across all searchable columns.
    pub search: Option<Search>,

    /// Column descriptors, in table order.
    pub columns: Vec<ColumnParam>,

    /// Sort instructions, primary key first.
    pub order: Vec<OrderParam>,
}

impl RequestParameters {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the global search term, or `""` when absent.
    pub fn search_term(&self) -> &str {
        self.search.as_ref().map_or("", |s| s.value.as_str())
    }

    /// Returns `true` if at least one column descriptor is present.
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Looks up the column an order entry points at.
    pub fn column(&self, index: usize) -> Option<&ColumnParam> {
        self.columns.get(index)
    }

    /// Returns the draw token the response should echo.
    pub fn draw_token(&self) -> i64 {
        self.draw.unwrap_or(0)
    }

    /// Sets the draw token.
    pub fn with_draw(mut self, draw: i64) -> Self {
        self.draw = Some(draw);
        self
    }

    /// Sets the number of rows to skip.
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the page size; negative means unlimited.
    pub fn with_length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the global search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(Search::new(term));
        self
    }

    /// Appends a column descriptor.
    pub fn with_column(mut self, column: ColumnParam) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends an order entry pointing at `columns[column]`.
    pub fn with_order(mut self, column: usize, dir: Dir) -> Self {
        self.order.push(OrderParam {
            column: Some(column),
            dir,
        });
        self
    }
}

/// A search value, global or per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Search {
    pub value: String,
}

impl Search {
    /// Creates a search for `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Search {
            value: value.into(),
        }
    }

    /// Returns `true` if there is nothing to search for.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// One `columns[i]` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnParam {
    /// Logical column name as the client knows it.
    ///
    /// Array-backed tables send an index here; scalars are read as text and
    /// `null` as `""`.
    #[serde(deserialize_with = "coerce::text")]
    pub data: String,

    /// Whether the column takes part in search.
    #[serde(deserialize_with = "coerce::flag")]
    pub searchable: bool,

    /// Whether the column takes part in sorting.
    #[serde(deserialize_with = "coerce::flag")]
    pub orderable: bool,

    /// Per-column search value.
    pub search: Search,
}

impl ColumnParam {
    /// Creates a descriptor that is neither searchable nor orderable.
    pub fn new(data: impl Into<String>) -> Self {
        ColumnParam {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Sets the searchable flag.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Sets the orderable flag.
    pub fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    /// Sets the per-column search value.
    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Search::new(value);
        self
    }

    /// Returns the per-column search value.
    pub fn search_value(&self) -> &str {
        &self.search.value
    }
}

/// One `order[i]` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderParam {
    /// Index into `columns`. `None` when the client sent something that is
    /// not a valid index; such entries are skipped.
    #[serde(default, deserialize_with = "coerce::index")]
    pub column: Option<usize>,

    #[serde(default)]
    pub dir: Dir,
}

mod coerce {
    use serde::de::Error;
    use serde_json::Value;

    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Bool(bool),
        Text(String),
    }

    impl Scalar {
        /// Blank text counts as absent.
        fn present(self) -> Option<Scalar> {
            match self {
                Scalar::Text(s) if s.trim().is_empty() => None,
                other => Some(other),
            }
        }

        fn strict_int<E: Error>(self, what: &str) -> Result<i64, E> {
            match self {
                Scalar::Int(n) => Ok(n),
                Scalar::Float(f) if f.fract() == 0.0 => Ok(f as i64),
                Scalar::Text(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("invalid {what}: {s:?}"))),
                _ => Err(E::custom(format!("invalid {what}"))),
            }
        }
    }

    /// Reads the leading integer of a string the way a loose integer cast
    /// does: optional sign, then digits; anything unreadable is 0. Values
    /// past the `i64` range saturate.
    pub(super) fn leading_int(s: &str) -> i64 {
        let s = s.trim_start();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        digits
            .bytes()
            .take_while(u8::is_ascii_digit)
            .map(|b| i64::from(b - b'0'))
            .fold(0i64, |acc, digit| {
                let shifted = acc.saturating_mul(10);
                if negative {
                    shifted.saturating_sub(digit)
                } else {
                    shifted.saturating_add(digit)
                }
            })
    }

    pub(super) fn draw<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?;
        Ok(raw.map(|scalar| match scalar {
            Scalar::Int(n) => n,
            Scalar::Float(f) => f as i64,
            Scalar::Bool(b) => i64::from(b),
            Scalar::Text(s) => leading_int(&s),
        }))
    }

    pub(super) fn offset<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::present);
        raw.map(|scalar| scalar.strict_int("start").map(|n| n.max(0) as u64))
            .transpose()
    }

    pub(super) fn length<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::present);
        raw.map(|scalar| scalar.strict_int("length")).transpose()
    }

    /// Anything that is not a non-negative integer reads as `None`.
    pub(super) fn index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|value| match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            })
            .and_then(|n| usize::try_from(n).ok()))
    }

    pub(super) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Bool(b)) => b,
            Some(Scalar::Text(s)) => s == "true",
            _ => false,
        })
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> RequestParameters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_object_gives_defaults() {
        let params = parse(json!({}));
        assert_eq!(params, RequestParameters::default());
        assert_eq!(params.search_term(), "");
        assert_eq!(params.draw_token(), 0);
        assert!(!params.has_columns());
    }

    #[test]
    fn numbers_accept_text() {
        let params = parse(json!({"draw": "4", "start": "20", "length": "-1"}));
        assert_eq!(params.draw, Some(4));
        assert_eq!(params.start, Some(20));
        assert_eq!(params.length, Some(-1));
    }

    #[test]
    fn draw_is_never_raw_text() {
        assert_eq!(parse(json!({"draw": "12abc"})).draw, Some(12));
        assert_eq!(parse(json!({"draw": "<script>"})).draw, Some(0));
        assert_eq!(parse(json!({"draw": " -3"})).draw, Some(-3));
        assert_eq!(parse(json!({"draw": 9})).draw, Some(9));
    }

    #[test]
    fn negative_start_clamps_to_zero() {
        assert_eq!(parse(json!({"start": -5})).start, Some(0));
    }

    #[test]
    fn bad_length_is_rejected() {
        let result = serde_json::from_value::<RequestParameters>(json!({"length": "ten"}));
        assert!(result.is_err());
    }

    #[test]
    fn only_true_sets_flags() {
        let params = parse(json!({
            "columns": [
                {"data": "a", "searchable": "true", "orderable": "false"},
                {"data": "b", "searchable": "TRUE", "orderable": true},
                {"data": "c"}
            ]
        }));
        assert!(params.columns[0].searchable);
        assert!(!params.columns[0].orderable);
        assert!(!params.columns[1].searchable);
        assert!(params.columns[1].orderable);
        assert!(!params.columns[2].searchable);
        assert!(!params.columns[2].orderable);
        assert_eq!(params.columns[2].search_value(), "");
    }

    #[test]
    fn order_entries_keep_request_order() {
        let params = parse(json!({
            "order": [{"column": "2", "dir": "desc"}, {"column": 0, "dir": "ASC"}]
        }));
        assert_eq!(
            params.order,
            vec![
                OrderParam {
                    column: Some(2),
                    dir: Dir::Desc
                },
                OrderParam {
                    column: Some(0),
                    dir: Dir::Asc
                },
            ]
        );
    }

    #[test]
    fn unusable_order_indexes_do_not_reject_the_request() {
        let params = parse(json!({
            "columns": [{"data": "name", "orderable": "true"}],
            "order": [
                {"column": -1, "dir": "asc"},
                {"column": "x", "dir": "asc"},
                {"dir": "asc"},
                {"column": 0, "dir": "desc"}
            ]
        }));

        let columns: Vec<Option<usize>> = params.order.iter().map(|o| o.column).collect();
        assert_eq!(columns, vec![None, None, None, Some(0)]);
        assert_eq!(params.order[3].dir, Dir::Desc);
    }

    #[test]
    fn blank_window_values_are_absent() {
        let params = parse(json!({"start": "", "length": "  "}));
        assert_eq!(params.start, None);
        assert_eq!(params.length, None);
    }

    #[test]
    fn scalar_column_data_reads_as_text() {
        let params = parse(json!({
            "columns": [{"data": 0}, {"data": null}, {"data": true}, {"data": "name"}]
        }));
        let data: Vec<&str> = params.columns.iter().map(|c| c.data.as_str()).collect();
        assert_eq!(data, vec!["0", "", "true", "name"]);
    }

    #[test]
    fn empty_search_values() {
        assert!(Search::default().is_empty());
        assert!(!Search::new("a").is_empty());
    }

    #[test]
    fn builder_helpers() {
        let params = RequestParameters::new()
            .with_draw(2)
            .with_start(10)
            .with_length(5)
            .with_search("x")
            .with_column(ColumnParam::new("name").searchable(true).search("y"))
            .with_order(0, Dir::Desc);

        assert_eq!(params.draw_token(), 2);
        assert_eq!(params.search_term(), "x");
        assert_eq!(params.column(0).map(|c| c.search_value()), Some("y"));
        assert!(params.column(1).is_none());
    }

    #[test]
    fn leading_int_reads_prefix() {
        assert_eq!(coerce::leading_int("42"), 42);
        assert_eq!(coerce::leading_int("42px"), 42);
        assert_eq!(coerce::leading_int("+7"), 7);
        assert_eq!(coerce::leading_int("abc"), 0);
        assert_eq!(coerce::leading_int(""), 0);
    }

    #[test]
    fn leading_int_saturates() {
        assert_eq!(coerce::leading_int("99999999999999999999"), i64::MAX);
        assert_eq!(coerce::leading_int("-99999999999999999999x"), i64::MIN);
        assert_eq!(coerce::leading_int("-9223372036854775808"), i64::MIN);
        assert_eq!(parse(json!({"draw": "99999999999999999999"})).draw, Some(i64::MAX));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn leading_int_ignores_trailing_text(
                n in -1_000_000_000i64..1_000_000_000,
                suffix in "[a-z<>/ ]{0,8}",
            ) {
                prop_assert_eq!(coerce::leading_int(&format!("{n}{suffix}")), n);
            }

            #[test]
            fn any_text_draw_parses(draw in ".{0,16}") {
                let params: RequestParameters =
                    serde_json::from_value(json!({ "draw": draw })).unwrap();
                prop_assert!(params.draw.is_some());
            }
        }
    }
}
