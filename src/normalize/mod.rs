//! Normalization of raw API records
//!
//! This module turns raw search records (nested field paths, HTML bodies)
//! into flat, immutable records:
//! - `Fields`: defaulting accessor over nested JSON
//! - `strip_markup`: HTML to readable plain text
//! - `Idea`, `Reply`, `BoardInfo`: normalized records

mod fields;
mod markup;
mod record;

pub use fields::Fields;
pub use markup::strip_markup;
pub use record::{
    enrich, normalize_board, normalize_idea, normalize_reply, reply_count_from, BoardInfo, Idea,
    Lifecycle, Reply,
};
