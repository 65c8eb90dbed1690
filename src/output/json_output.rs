//! JSON export

use crate::normalize::Idea;
use crate::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes records as a pretty-printed JSON array
///
/// The directory is created if missing. Replies stay nested under their
/// record; records fetched without replies carry no `replies` key.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(ForumError)` - Failed to create the directory or write the file
pub fn save_to_json(ideas: &[Idea], directory: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;
    let path = directory.join(filename);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, ideas)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Saved {} ideas to {}", ideas.len(), path.display());
    Ok(path)
}
