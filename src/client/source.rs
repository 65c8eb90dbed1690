//! Record source abstraction
//!
//! The extraction driver only needs four operations from the forum. Keeping
//! them behind a trait lets tests drive pagination from in-memory pages.

use crate::client::forum::ForumClient;
use crate::client::query::Cursor;
use crate::client::response::Page;
use crate::Result;
use serde_json::Value;

/// Operations the extraction driver performs against a forum
#[allow(async_fn_in_trait)]
pub trait ForumSource {
    /// Fetches one page of ideas ordered by descending vote weight
    async fn fetch_page(&self, board_id: &str, cursor: Option<&Cursor>, limit: u32)
        -> Result<Page>;

    /// Counts the ideas in a board
    async fn count_messages(&self, board_id: &str) -> Result<u64>;

    /// Fetches up to `limit` replies of a message
    async fn fetch_replies(&self, parent_id: &str, limit: u32) -> Result<Vec<Value>>;

    /// Re-fetches the full record of a message
    async fn fetch_message(&self, message_id: &str) -> Result<Value>;
}

impl ForumSource for ForumClient {
    async fn fetch_page(
        &self,
        board_id: &str,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> Result<Page> {
        ForumClient::fetch_page(self, board_id, cursor, limit).await
    }

    async fn count_messages(&self, board_id: &str) -> Result<u64> {
        ForumClient::count_messages(self, board_id).await
    }

    async fn fetch_replies(&self, parent_id: &str, limit: u32) -> Result<Vec<Value>> {
        ForumClient::fetch_replies(self, parent_id, limit).await
    }

    async fn fetch_message(&self, message_id: &str) -> Result<Value> {
        ForumClient::fetch_message(self, message_id).await
    }
}
