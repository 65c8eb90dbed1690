//! Forum client
//!
//! `ForumClient` owns the HTTP connection pool, the retry policy and the
//! request throttle. It is constructed explicitly and handed to the
//! extraction driver; nothing about it is global.

use crate::client::fetcher::{build_http_client, get_with_retry, RetryPolicy, Throttle};
use crate::client::query::{Cursor, Query};
use crate::client::response::{Page, SearchResponse};
use crate::config::{ApiConfig, Config, UserAgentConfig};
use crate::normalize::{normalize_board, BoardInfo};
use crate::{ConfigError, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Boards found on the community, grouped by kind
#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    pub categories: Vec<BoardInfo>,
    pub idea_boards: Vec<BoardInfo>,
    pub forum_boards: Vec<BoardInfo>,
}

/// Client for the community search API
#[derive(Debug)]
pub struct ForumClient {
    http: Client,
    base_url: Url,
    policy: RetryPolicy,
    throttle: Throttle,
}

impl ForumClient {
    /// Creates a client for the given endpoint and identity
    ///
    /// # Returns
    ///
    /// * `Ok(ForumClient)` - Ready to issue requests
    /// * `Err(ForumError)` - Invalid base URL or HTTP client construction failure
    pub fn new(api: &ApiConfig, user_agent: &UserAgentConfig) -> Result<Self> {
        let base_url = Url::parse(&api.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url '{}' cannot carry a path",
                api.base_url
            ))
            .into());
        }

        let http = build_http_client(user_agent, api)?;

        Ok(Self {
            http,
            base_url,
            policy: RetryPolicy::from_config(api),
            throttle: Throttle::new(api.request_delay()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api, &config.user_agent)
    }

    /// Builds `<base>/<segments...>`
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Executes a LiQL query against the search endpoint
    ///
    /// Transient failures are retried per the configured policy; a logical
    /// API failure is returned immediately.
    pub async fn execute_query(&self, query: &str) -> Result<SearchResponse> {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut().append_pair("q", query);

        tracing::debug!("Query: {}", query);
        let body = get_with_retry(&self.http, &self.throttle, &self.policy, &url, query).await?;
        SearchResponse::parse(&body, query)
    }

    /// Fetches one page of ideas, most voted first
    pub async fn fetch_page(
        &self,
        board_id: &str,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> Result<Page> {
        let query = Query::ideas_page(board_id, limit, cursor).to_string();
        let page = self.execute_query(&query).await?.into_page();
        tracing::debug!(
            "Fetched {} items from {} (more: {})",
            page.items.len(),
            board_id,
            page.next_cursor.is_some()
        );
        Ok(page)
    }

    /// Counts the top-level ideas in a board
    pub async fn count_messages(&self, board_id: &str) -> Result<u64> {
        let query = Query::idea_count(board_id).to_string();
        self.execute_query(&query).await?.count(&query)
    }

    /// Fetches up to `limit` direct replies of a message
    pub async fn fetch_replies(&self, parent_id: &str, limit: u32) -> Result<Vec<Value>> {
        if parent_id.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let query = Query::replies(parent_id, limit).to_string();
        Ok(self.execute_query(&query).await?.into_page().items)
    }

    /// Re-fetches the full record of a single message
    pub async fn fetch_message(&self, message_id: &str) -> Result<Value> {
        let url = self.endpoint(&["messages", message_id]);
        let label = format!("messages/{}", message_id);
        let body = get_with_retry(&self.http, &self.throttle, &self.policy, &url, &label).await?;
        Ok(SearchResponse::parse(&body, &label)?.data().clone())
    }

    /// Lists categories, idea boards and discussion boards
    pub async fn discover_boards(&self) -> Result<Discovery> {
        let categories = self.list_nodes(Query::categories()).await?;
        let idea_boards = self.list_nodes(Query::boards_by_style("idea")).await?;
        let forum_boards = self.list_nodes(Query::boards_by_style("forum")).await?;

        tracing::info!(
            "Discovered {} categories, {} idea boards, {} discussion boards",
            categories.len(),
            idea_boards.len(),
            forum_boards.len()
        );

        Ok(Discovery {
            categories,
            idea_boards,
            forum_boards,
        })
    }

    async fn list_nodes(&self, query: Query) -> Result<Vec<BoardInfo>> {
        let response = self.execute_query(&query.to_string()).await?;
        Ok(response.items().iter().map(normalize_board).collect())
    }
}
