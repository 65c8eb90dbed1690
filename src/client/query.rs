//! LiQL query construction
//!
//! The search endpoint accepts a small SQL-like language:
//!
//! ```text
//! SELECT <fields> FROM <entity> WHERE <predicates> ORDER BY <field> DESC LIMIT <n> CURSOR '<token>'
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Projection used for idea pages
pub const IDEA_FIELDS: &[&str] = &[
    "id",
    "subject",
    "body",
    "view_href",
    "post_time",
    "author.login",
    "author.id",
    "kudos.sum(weight)",
    "metrics.views",
    "conversation.messages_count",
    "conversation.id",
    "status.key",
    "status.name",
    "labels",
];

/// Projection used for replies
pub const REPLY_FIELDS: &[&str] = &[
    "id",
    "body",
    "post_time",
    "author.login",
    "author.id",
    "kudos.sum(weight)",
];

const BOARD_FIELDS: &[&str] = &["id", "title", "conversation_style", "parent.id"];

/// Ordering used for idea pages
const VOTE_WEIGHT: &str = "kudos.sum(weight)";

/// Opaque pagination token returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single textual request against the search endpoint
///
/// Queries are built per call and carry no identity; rendering is done by
/// the `Display` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    fields: Vec<String>,
    entity: String,
    predicates: Vec<String>,
    order_by: Option<String>,
    limit: Option<u32>,
    cursor: Option<Cursor>,
}

impl Query {
    /// Starts a `SELECT` over the given projection
    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            entity: "messages".to_string(),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
            cursor: None,
        }
    }

    pub fn from(mut self, entity: &str) -> Self {
        self.entity = entity.to_string();
        self
    }

    /// Adds `field = '<value>'`
    pub fn where_eq(mut self, field: &str, value: &str) -> Self {
        self.predicates
            .push(format!("{} = {}", field, quote_literal(value)));
        self
    }

    /// Adds `field = <value>` for numeric comparisons
    pub fn where_num(mut self, field: &str, value: i64) -> Self {
        self.predicates.push(format!("{} = {}", field, value));
        self
    }

    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn cursor(mut self, cursor: Option<&Cursor>) -> Self {
        self.cursor = cursor.cloned();
        self
    }

    /// One page of top-level ideas in a board, most voted first
    pub fn ideas_page(board_id: &str, limit: u32, cursor: Option<&Cursor>) -> Self {
        Self::select(IDEA_FIELDS.iter().copied())
            .where_eq("board.id", board_id)
            .where_num("depth", 0)
            .order_by_desc(VOTE_WEIGHT)
            .limit(limit)
            .cursor(cursor)
    }

    /// Number of top-level ideas in a board
    pub fn idea_count(board_id: &str) -> Self {
        Self::select(["count(*)"])
            .where_eq("board.id", board_id)
            .where_num("depth", 0)
    }

    /// Direct replies to a message
    pub fn replies(parent_id: &str, limit: u32) -> Self {
        Self::select(REPLY_FIELDS.iter().copied())
            .where_eq("parent.id", parent_id)
            .limit(limit)
    }

    /// Every category node
    pub fn categories() -> Self {
        Self::select(["id", "title", "node_type"])
            .from("nodes")
            .where_eq("node_type", "category")
            .limit(500)
    }

    /// Boards of one conversation style (`idea`, `forum`, ...)
    pub fn boards_by_style(style: &str) -> Self {
        Self::select(BOARD_FIELDS.iter().copied())
            .from("nodes")
            .where_eq("conversation_style", style)
            .limit(200)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields.join(", "), self.entity)?;
        if !self.predicates.is_empty() {
            write!(f, " WHERE {}", self.predicates.join(" AND "))?;
        }
        if let Some(field) = &self.order_by {
            write!(f, " ORDER BY {} DESC", field)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(cursor) = &self.cursor {
            write!(f, " CURSOR {}", quote_literal(cursor.as_str()))?;
        }
        Ok(())
    }
}

/// Quotes a string literal, escaping backslashes and single quotes
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}
