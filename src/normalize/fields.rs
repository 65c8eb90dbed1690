//! Defaulting accessor over nested JSON records
//!
//! Raw records omit whole sub-objects when the server has nothing to say
//! (an idea without votes has no `kudos` object at all). Every accessor here
//! takes a dotted path and documents what it returns when any step of the
//! path is missing or has an unexpected type:
//!
//! | Accessor | Missing / wrong type |
//! |----------|----------------------|
//! | `int` | `0` |
//! | `opt_int` | `None` |
//! | `text` | `""` |
//! | `opt_text` | `None` (empty strings included) |
//! | `flag` | `false` |
//! | `labels` | empty list |

use serde_json::Value;

/// Read-only view over a raw record
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    raw: &'a Value,
}

impl<'a> Fields<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// Follows a dotted path such as `kudos.sum.weight`
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        path.split('.')
            .try_fold(self.raw, |value, key| value.as_object()?.get(key))
            .filter(|value| !value.is_null())
    }

    /// Integer at `path`; numbers encoded as strings are accepted
    pub fn opt_int(&self, path: &str) -> Option<i64> {
        match self.lookup(path)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn int(&self, path: &str) -> i64 {
        self.opt_int(path).unwrap_or(0)
    }

    /// Non-negative integer at `path`, negatives clamp to zero
    pub fn count(&self, path: &str) -> u64 {
        u64::try_from(self.int(path)).unwrap_or(0)
    }

    /// String at `path`; numeric ids are rendered as text
    pub fn opt_text(&self, path: &str) -> Option<String> {
        match self.lookup(path)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text(&self, path: &str) -> String {
        self.opt_text(path).unwrap_or_default()
    }

    pub fn flag(&self, path: &str) -> bool {
        match self.lookup(path) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Label texts at `path`
    ///
    /// Accepts both a plain array of strings and the collection shape
    /// `{ "items": [{ "text": ... }] }`.
    pub fn labels(&self, path: &str) -> Vec<String> {
        let items = match self.lookup(path) {
            Some(Value::Array(items)) => items,
            Some(Value::Object(map)) => match map.get("items") {
                Some(Value::Array(items)) => items,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => {
                    let fields = Fields::new(item);
                    fields.opt_text("text").or_else(|| fields.opt_text("id"))
                }
                _ => None,
            })
            .filter(|label| !label.is_empty())
            .collect()
    }
}
