//! CSV export
//!
//! CSV rows are flat: replies and HTML bodies are dropped and body text is
//! cut to a fixed character budget so spreadsheets stay readable.

use crate::normalize::Idea;
use crate::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One flattened CSV row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRow<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub body_text: String,
    pub url: Option<&'a str>,
    pub post_date: Option<&'a str>,
    pub author_username: Option<&'a str>,
    pub author_id: Option<&'a str>,
    pub kudos: i64,
    pub views: u64,
    pub reply_count: u64,
    pub status_key: Option<&'a str>,
    pub status_name: Option<&'a str>,
    pub conversation_id: Option<&'a str>,
    pub labels: String,
    pub solved: bool,
    pub board_id: &'a str,
    pub scraped_at: String,
}

impl<'a> CsvRow<'a> {
    pub fn from_idea(idea: &'a Idea, body_limit: usize) -> Self {
        Self {
            id: &idea.id,
            title: &idea.title,
            body_text: truncate_chars(&idea.body_text, body_limit),
            url: idea.url.as_deref(),
            post_date: idea.post_date.as_deref(),
            author_username: idea.author_username.as_deref(),
            author_id: idea.author_id.as_deref(),
            kudos: idea.kudos,
            views: idea.views,
            reply_count: idea.reply_count,
            status_key: idea.status_key.as_deref(),
            status_name: idea.status_name.as_deref(),
            conversation_id: idea.conversation_id.as_deref(),
            labels: idea.labels.join(";"),
            solved: idea.solved,
            board_id: &idea.board_id,
            scraped_at: idea.scraped_at.to_rfc3339(),
        }
    }
}

/// Keeps at most `limit` characters (Unicode scalar values)
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Writes records as flattened CSV
///
/// # Returns
///
/// * `Ok(Some(PathBuf))` - Path of the written file
/// * `Ok(None)` - Nothing to write; no file is created for an empty list
/// * `Err(ForumError)` - Failed to create the directory or write the file
pub fn save_to_csv(
    ideas: &[Idea],
    directory: &Path,
    filename: &str,
    body_limit: usize,
) -> Result<Option<PathBuf>> {
    if ideas.is_empty() {
        tracing::info!("No ideas to write, skipping CSV export");
        return Ok(None);
    }

    fs::create_dir_all(directory)?;
    let path = directory.join(filename);

    let mut writer = csv::Writer::from_path(&path)?;
    for idea in ideas {
        writer.serialize(CsvRow::from_idea(idea, body_limit))?;
    }
    writer.flush()?;

    tracing::info!("Saved {} ideas to {}", ideas.len(), path.display());
    Ok(Some(path))
}
