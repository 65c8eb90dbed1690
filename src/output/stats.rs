//! Statistics over extracted records
//!
//! This module computes and prints the summaries shown at the end of a
//! run: top records by votes, status distribution, board sample totals
//! and discovery listings.

use crate::client::Discovery;
use crate::normalize::{BoardInfo, Idea};
use std::collections::HashMap;

/// Label used when a record carries no status name
const UNKNOWN_STATUS: &str = "Unknown";

/// Summary of one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionStatistics {
    /// Records exported
    pub total_ideas: usize,

    /// Replies fetched across all records
    pub total_replies_fetched: usize,

    /// Status name and count, most frequent first
    pub status_distribution: Vec<(String, usize)>,
}

impl ExtractionStatistics {
    pub fn from_ideas(ideas: &[Idea]) -> Self {
        Self {
            total_ideas: ideas.len(),
            total_replies_fetched: ideas
                .iter()
                .map(|idea| idea.replies.as_ref().map_or(0, Vec::len))
                .sum(),
            status_distribution: status_distribution(ideas),
        }
    }
}

/// Sample statistics for a board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardStatistics {
    pub board_id: String,

    /// Records in the sample
    pub sample_size: usize,

    pub total_kudos: i64,
    pub total_views: u64,

    /// Status name and count over the records that carry a status
    pub status_distribution: Vec<(String, usize)>,

    /// Records that carried a status
    pub statuses_known: usize,
}

impl BoardStatistics {
    pub fn from_sample(board_id: &str, ideas: &[Idea]) -> Self {
        let with_status: Vec<Idea> = ideas
            .iter()
            .filter(|idea| idea.status_name.is_some())
            .cloned()
            .collect();

        Self {
            board_id: board_id.to_string(),
            sample_size: ideas.len(),
            total_kudos: ideas.iter().map(|idea| idea.kudos).sum(),
            total_views: ideas.iter().map(|idea| idea.views).sum(),
            status_distribution: status_distribution(&with_status),
            statuses_known: with_status.len(),
        }
    }
}

/// Counts records per status name, most frequent first (ties by name)
pub fn status_distribution(ideas: &[Idea]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for idea in ideas {
        let status = idea.status_name.as_deref().unwrap_or(UNKNOWN_STATUS);
        *counts.entry(status).or_insert(0) += 1;
    }

    let mut distribution: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

/// Prints a run summary to stdout
///
/// # Arguments
///
/// * `ideas` - Exported records, in server order
pub fn print_statistics(ideas: &[Idea]) {
    let stats = ExtractionStatistics::from_ideas(ideas);

    println!("=== Extraction Summary ===\n");
    println!("Total ideas fetched: {}", stats.total_ideas);

    if ideas.is_empty() {
        return;
    }

    if stats.total_replies_fetched > 0 {
        println!("Total replies fetched: {}", stats.total_replies_fetched);
    }

    println!("\nTop 10 by votes:");
    for (rank, idea) in ideas.iter().take(10).enumerate() {
        let title: String = idea.title.chars().take(50).collect();
        println!(
            "  {:2}. [{:4} votes, {:3} replies] {}...",
            rank + 1,
            idea.kudos,
            idea.reply_count,
            title
        );
        println!(
            "      Status: {}",
            idea.status_name.as_deref().unwrap_or(UNKNOWN_STATUS)
        );
        if let Some(first) = idea.replies.as_ref().and_then(|replies| replies.first()) {
            println!(
                "      First reply by: {}",
                first.author.as_deref().unwrap_or("unknown")
            );
        }
    }

    println!("\nStatus distribution:");
    for (status, count) in &stats.status_distribution {
        println!("  {}: {}", status, count);
    }
}

/// Prints board sample statistics to stdout
pub fn print_board_statistics(stats: &BoardStatistics) {
    println!("=== Board Statistics: {} ===\n", stats.board_id);
    println!("  Sample size: {} messages", stats.sample_size);
    println!("  Total kudos (sample): {}", stats.total_kudos);
    println!("  Total views (sample): {}", stats.total_views);

    if stats.statuses_known > 0 {
        println!(
            "\n  Status distribution (sample of {}):",
            stats.statuses_known
        );
        for (status, count) in &stats.status_distribution {
            let percentage = *count as f64 / stats.statuses_known as f64 * 100.0;
            println!("    {:30} {:4} ({:.1}%)", status, count, percentage);
        }
    }
}

/// Prints a board discovery listing to stdout
///
/// Read-only boards are left out of the listing.
pub fn print_discovery(discovery: &Discovery) {
    println!("=== Forum Discovery ===");

    println!("\nCategories ({}):", discovery.categories.len());
    let mut categories: Vec<_> = discovery.categories.iter().collect();
    categories.sort_by(|a, b| a.title.cmp(&b.title));
    for category in categories {
        println!("  {:40} {}", category.short_id(), category.title);
    }

    for (heading, boards) in [
        ("Idea boards", &discovery.idea_boards),
        ("Discussion boards", &discovery.forum_boards),
    ] {
        println!("\n{} ({}):", heading, boards.len());
        for board in listed_boards(boards) {
            let title: String = board.title.chars().take(40).collect();
            println!("  {:40} {}", board.short_id(), title);
        }
    }
}

/// Writable boards sorted by title
pub fn listed_boards(boards: &[BoardInfo]) -> Vec<&BoardInfo> {
    let mut listed: Vec<&BoardInfo> = boards.iter().filter(|b| !b.is_read_only()).collect();
    listed.sort_by(|a, b| a.title.cmp(&b.title));
    listed
}
