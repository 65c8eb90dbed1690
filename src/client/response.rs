//! Search response validation
//!
//! Every search reply is a JSON envelope:
//!
//! ```json
//! { "status": "success", "data": { "items": [...], "next_cursor": "..." } }
//! ```
//!
//! A body that is not JSON or has no `status` is malformed; any status other
//! than `success` is a logical API failure.

use crate::client::query::Cursor;
use crate::client::query_preview;
use crate::{ForumError, Result};
use serde_json::Value;

/// One page of raw records plus the resume point for the next page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Raw records in server order
    pub items: Vec<Value>,

    /// Cursor for the next page, `None` once the result set is exhausted
    pub next_cursor: Option<Cursor>,
}

/// A validated, successful search response
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    data: Value,
}

impl SearchResponse {
    /// Parses and validates a response body
    ///
    /// # Arguments
    ///
    /// * `body` - Raw response text
    /// * `query` - The query that produced it, quoted in errors
    pub fn parse(body: &str, query: &str) -> Result<Self> {
        let envelope: Value =
            serde_json::from_str(body).map_err(|e| ForumError::MalformedResponse {
                reason: format!("body is not JSON: {}", e),
                query: query_preview(query),
            })?;

        let status = envelope
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| ForumError::MalformedResponse {
                reason: "missing status field".to_string(),
                query: query_preview(query),
            })?;

        if status != "success" {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            return Err(ForumError::Api {
                message: message.to_string(),
                query: query_preview(query),
            });
        }

        match envelope.get("data") {
            Some(data) if data.is_object() => Ok(Self { data: data.clone() }),
            _ => Err(ForumError::MalformedResponse {
                reason: "missing data object".to_string(),
                query: query_preview(query),
            }),
        }
    }

    /// The `data` object of the response
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Records in `data.items`; an absent list reads as empty
    pub fn items(&self) -> &[Value] {
        self.data
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `data.next_cursor`, ignoring empty tokens
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.data
            .get("next_cursor")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(Cursor::new)
    }

    /// `data.count` as returned by `SELECT count(*)`
    pub fn count(&self, query: &str) -> Result<u64> {
        self.data
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| ForumError::MalformedResponse {
                reason: "missing data.count".to_string(),
                query: query_preview(query),
            })
    }

    pub fn into_page(self) -> Page {
        let next_cursor = self.next_cursor();
        let items = match self.data {
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Page { items, next_cursor }
    }
}
