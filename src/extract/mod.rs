//! Extraction driver
//!
//! This module orchestrates a full board extraction:
//! - Cursor pagination until exhaustion or the item cap
//! - Client-side reply-count filtering
//! - Optional enrichment and reply fetching per record
//! - Progress reporting once per page

mod driver;
mod state;

pub use driver::{ExtractOptions, Extraction, Progress};
pub use state::ExtractionState;

use crate::client::ForumSource;
use crate::normalize::Idea;
use crate::Result;

/// Runs a complete extraction and collects every record
///
/// This is the main entry point when no progress reporting is needed.
/// A failure aborts the run; records gathered so far are dropped.
pub async fn extract_all<S: ForumSource>(
    source: &S,
    board_id: &str,
    options: ExtractOptions,
) -> Result<Vec<Idea>> {
    Extraction::new(source, board_id, options).collect_all().await
}
