//! Normalized record types
//!
//! Records are built once from raw API values and never mutated afterwards.
//! Enrichment consumes a record and returns a new one.

use crate::normalize::fields::Fields;
use crate::normalize::markup::strip_markup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A top-level idea (root message of a conversation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    pub title: String,
    pub body_html: String,
    pub body_text: String,
    pub url: Option<String>,
    pub post_date: Option<String>,
    pub author_username: Option<String>,
    pub author_id: Option<String>,
    pub kudos: i64,
    pub views: u64,
    pub reply_count: u64,
    pub status_key: Option<String>,
    pub status_name: Option<String>,
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub solved: bool,
    pub board_id: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<Reply>>,
}

impl Idea {
    /// Lifecycle derived from the status key
    pub fn lifecycle(&self) -> Lifecycle {
        self.status_key
            .as_deref()
            .map_or(Lifecycle::Other, Lifecycle::from_key)
    }

    /// Returns a copy carrying the given replies
    pub fn with_replies(self, replies: Vec<Reply>) -> Self {
        Self {
            replies: Some(replies),
            ..self
        }
    }
}

/// A reply to an idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    /// Id of the idea this reply belongs to
    pub parent_id: String,
    pub author: Option<String>,
    pub author_id: Option<String>,
    pub body_html: String,
    pub body_text: String,
    pub post_time: Option<String>,
    pub kudos: i64,
}

/// Idea lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    New,
    UnderReview,
    Accepted,
    InProgress,
    Implemented,
    Declined,
    Duplicate,
    Other,
}

impl Lifecycle {
    /// Maps a status key to a lifecycle stage
    ///
    /// Keys are compared case-insensitively with `_` and spaces treated as `-`.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "new" | "open" => Self::New,
            "under-review" | "reviewing" | "under-consideration" | "gathering-support" => {
                Self::UnderReview
            }
            "accepted" | "planned" | "future-consideration" => Self::Accepted,
            "in-progress" | "in-development" | "started" => Self::InProgress,
            "implemented" | "completed" | "delivered" | "released" => Self::Implemented,
            "declined" | "not-planned" | "closed" | "rejected" => Self::Declined,
            "duplicate" | "already-offered" | "already-exists" => Self::Duplicate,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::UnderReview => "under_review",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Implemented => "implemented",
            Self::Declined => "declined",
            Self::Duplicate => "duplicate",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board or category node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub id: String,
    pub title: String,
    pub conversation_style: Option<String>,
    pub parent_id: Option<String>,
}

impl BoardInfo {
    /// Id without its `board:` / `category:` node prefix
    pub fn short_id(&self) -> &str {
        self.id
            .strip_prefix("board:")
            .or_else(|| self.id.strip_prefix("category:"))
            .unwrap_or(&self.id)
    }

    pub fn is_read_only(&self) -> bool {
        self.title.contains("Read Only")
    }
}

/// Replies in a conversation of `messages_count` messages, root excluded
pub fn reply_count_from(messages_count: i64) -> u64 {
    u64::try_from(messages_count.saturating_sub(1)).unwrap_or(0)
}

/// Builds an `Idea` from a raw search record
///
/// Missing optional fields default (votes, views and conversation size to
/// zero, strings to empty or `None`); this never fails.
pub fn normalize_idea(raw: &Value, board_id: &str) -> Idea {
    let fields = Fields::new(raw);
    let body_html = fields.text("body");

    Idea {
        id: fields.text("id"),
        title: fields.text("subject"),
        body_text: strip_markup(&body_html),
        body_html,
        url: fields.opt_text("view_href"),
        post_date: fields.opt_text("post_time"),
        author_username: fields.opt_text("author.login"),
        author_id: fields.opt_text("author.id"),
        kudos: fields.int("kudos.sum.weight"),
        views: fields.count("metrics.views"),
        reply_count: reply_count_from(fields.int("conversation.messages_count")),
        status_key: fields.opt_text("status.key"),
        status_name: fields.opt_text("status.name"),
        conversation_id: fields.opt_text("conversation.id"),
        labels: fields.labels("labels"),
        solved: fields.flag("conversation.solved"),
        board_id: board_id.to_string(),
        scraped_at: Utc::now(),
        replies: None,
    }
}

/// Builds a `Reply` from a raw search record
pub fn normalize_reply(raw: &Value, parent_id: &str) -> Reply {
    let fields = Fields::new(raw);
    let body_html = fields.text("body");

    Reply {
        id: fields.text("id"),
        parent_id: parent_id.to_string(),
        author: fields.opt_text("author.login"),
        author_id: fields.opt_text("author.id"),
        body_text: strip_markup(&body_html),
        body_html,
        post_time: fields.opt_text("post_time"),
        kudos: fields.int("kudos.sum.weight"),
    }
}

/// Builds a board node from a raw `nodes` record
pub fn normalize_board(raw: &Value) -> BoardInfo {
    let fields = Fields::new(raw);
    BoardInfo {
        id: fields.text("id"),
        title: fields.text("title"),
        conversation_style: fields.opt_text("conversation_style"),
        parent_id: fields.opt_text("parent.id"),
    }
}

/// Combines an idea with its full re-fetched message record
///
/// Status, body, conversation size and solved flag come from the full
/// record when it carries them; everything else is kept.
pub fn enrich(idea: Idea, full: &Value) -> Idea {
    let fields = Fields::new(full);

    let (body_html, body_text) = match fields.opt_text("body") {
        Some(html) => {
            let text = strip_markup(&html);
            (html, text)
        }
        None => (idea.body_html.clone(), idea.body_text.clone()),
    };

    Idea {
        status_key: fields.opt_text("status.key").or(idea.status_key.clone()),
        status_name: fields.opt_text("status.name").or(idea.status_name.clone()),
        reply_count: fields
            .opt_int("conversation.messages_count")
            .map_or(idea.reply_count, reply_count_from),
        solved: fields.flag("conversation.solved") || idea.solved,
        body_html,
        body_text,
        ..idea
    }
}
