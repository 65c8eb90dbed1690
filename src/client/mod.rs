//! Query client for the community search API
//!
//! This module contains everything that talks to the forum, including:
//! - Building LiQL query text
//! - HTTP requests with retry, backoff and a fixed inter-request delay
//! - Validating search responses and extracting pages and cursors
//! - The `ForumSource` seam the extraction driver depends on

mod fetcher;
mod forum;
mod query;
mod response;
mod source;

pub use fetcher::{build_http_client, is_retryable_status, parse_retry_after, RetryPolicy};
pub use forum::{Discovery, ForumClient};
pub use query::{Cursor, Query, IDEA_FIELDS, REPLY_FIELDS};
pub use response::{Page, SearchResponse};
pub use source::ForumSource;

/// Longest prefix of a query quoted in error messages
pub(crate) const QUERY_PREVIEW_CHARS: usize = 200;

/// Shortens query text for inclusion in diagnostics
pub(crate) fn query_preview(query: &str) -> String {
    query.chars().take(QUERY_PREVIEW_CHARS).collect()
}
