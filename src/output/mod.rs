//! Output module for exported records and run summaries
//!
//! This module handles:
//! - Writing records as pretty JSON (replies nested)
//! - Writing flattened CSV (replies and HTML dropped, bodies truncated)
//! - Generating output filename prefixes
//! - Computing and printing summary statistics

mod csv_output;
mod json_output;
pub mod stats;

pub use csv_output::{save_to_csv, truncate_chars, CsvRow};
pub use json_output::save_to_json;
pub use stats::{
    listed_boards, print_board_statistics, print_discovery, print_statistics, BoardStatistics,
    ExtractionStatistics,
};

use crate::extract::ExtractOptions;
use chrono::NaiveDateTime;

/// Builds the default export prefix for a run
///
/// Format: `<board>_top<N>[_minrep<a>][_maxrep<b>][_with<r>replies]_<YYYYmmdd_HHMMSS>`
/// where `N` is the number of records actually exported. Zero-valued
/// filters are left out.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use forum_harvest::extract::ExtractOptions;
/// use forum_harvest::output::default_prefix;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 0).unwrap();
/// let prefix = default_prefix("acc-ideas-en", 100, &ExtractOptions::default(), at);
/// assert_eq!(prefix, "acc_ideas_en_top100_20240309_140500");
/// ```
pub fn default_prefix(
    board_id: &str,
    exported: usize,
    options: &ExtractOptions,
    at: NaiveDateTime,
) -> String {
    let mut parts = vec![board_id.replace('-', "_"), format!("top{}", exported)];

    if let Some(min) = options.min_replies.filter(|&n| n > 0) {
        parts.push(format!("minrep{}", min));
    }
    if let Some(max) = options.max_replies.filter(|&n| n > 0) {
        parts.push(format!("maxrep{}", max));
    }
    if options.replies_per_item > 0 {
        parts.push(format!("with{}replies", options.replies_per_item));
    }
    parts.push(at.format("%Y%m%d_%H%M%S").to_string());

    parts.join("_")
}
