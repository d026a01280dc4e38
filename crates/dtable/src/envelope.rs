//! The protocol response shape.

use serde::Serialize;

use crate::error::Result;
use crate::translator::Translation;

/// `{draw, recordsTotal, recordsFiltered, data}`, serialized in that order.
///
/// `draw` is always the integer token from the request (0 when absent),
/// never the raw request text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<R> {
    pub draw: i64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<R>,
}

impl<R> ResponseEnvelope<R> {
    /// Assembles the envelope from a pipeline run.
    pub fn new(draw: i64, translation: Translation<R>) -> Self {
        ResponseEnvelope {
            draw,
            records_total: translation.records_total,
            records_filtered: translation.records_filtered,
            data: translation.rows,
        }
    }
}

impl<R: Serialize> ResponseEnvelope<R> {
    /// Serializes the envelope to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the envelope to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
