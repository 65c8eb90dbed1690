//! Extraction driver - pagination, filtering and per-record follow-ups
//!
//! `Extraction` is a pull-based lazy sequence: each call to `next_record`
//! issues only the requests needed to produce the next record. Records come
//! out in server order (descending vote weight); filters only remove.

use crate::client::{Cursor, ForumSource};
use crate::extract::state::ExtractionState;
use crate::normalize::{enrich, normalize_idea, normalize_reply, Idea};
use crate::{ForumError, Result};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};

/// Options for a single extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Stop after this many records (`None` fetches everything)
    pub max_items: Option<usize>,

    /// Keep only records with at least this many replies
    pub min_replies: Option<u64>,

    /// Keep only records with at most this many replies
    pub max_replies: Option<u64>,

    /// Replies fetched per record (0 disables the reply sub-request)
    pub replies_per_item: u32,

    /// Re-fetch each record's full message before producing it
    pub enrich: bool,

    /// Items requested per page
    pub batch_size: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_items: None,
            min_replies: None,
            max_replies: None,
            replies_per_item: 0,
            enrich: false,
            batch_size: 100,
        }
    }
}

impl ExtractOptions {
    /// Returns true if a record with `reply_count` replies passes the filters
    pub fn accepts(&self, reply_count: u64) -> bool {
        self.min_replies.map_or(true, |min| reply_count >= min)
            && self.max_replies.map_or(true, |max| reply_count <= max)
    }
}

/// Progress snapshot reported once per fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Pages fetched so far
    pub pages_fetched: u32,

    /// Raw items received so far, before filtering
    pub items_fetched: usize,

    /// Total items in the board, when known
    pub total: Option<u64>,
}

type ProgressCallback<'a> = Box<dyn FnMut(&Progress) + 'a>;

/// A single extraction run over one board
///
/// Runs are restartable only from scratch: a new `Extraction` starts again
/// at page one.
pub struct Extraction<'a, S> {
    source: &'a S,
    board_id: String,
    options: ExtractOptions,
    state: ExtractionState,
    cursor: Option<Cursor>,
    buffer: VecDeque<Value>,
    seen: HashSet<String>,
    pages_fetched: u32,
    items_fetched: usize,
    yielded: usize,
    total: Option<u64>,
    progress: Option<ProgressCallback<'a>>,
}

impl<'a, S: ForumSource> Extraction<'a, S> {
    /// Creates a run in the `Init` state; nothing is requested until the first pull
    pub fn new(source: &'a S, board_id: impl Into<String>, options: ExtractOptions) -> Self {
        Self {
            source,
            board_id: board_id.into(),
            options,
            state: ExtractionState::Init,
            cursor: None,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            pages_fetched: 0,
            items_fetched: 0,
            yielded: 0,
            total: None,
            progress: None,
        }
    }

    /// Installs a progress callback
    ///
    /// With a callback installed the run first issues one count query so
    /// progress can be reported against the board total.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Progress) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> ExtractionState {
        self.state
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Records produced so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Board total, once the count query has run
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Produces the next record, or `None` once the run has ended
    ///
    /// An error moves the run to `Failed`; later calls return `Ok(None)`.
    pub async fn next_record(&mut self) -> Result<Option<Idea>> {
        loop {
            match self.state {
                ExtractionState::Done | ExtractionState::Failed => return Ok(None),

                ExtractionState::Exhausted | ExtractionState::LimitReached => {
                    tracing::debug!(
                        "Extraction of {} finished ({}): {} records from {} pages",
                        self.board_id,
                        self.state,
                        self.yielded,
                        self.pages_fetched
                    );
                    self.transition(ExtractionState::Done);
                    return Ok(None);
                }

                ExtractionState::Init => {
                    if self.limit_reached() {
                        self.transition(ExtractionState::LimitReached);
                        continue;
                    }
                    if self.progress.is_some() {
                        let source = self.source;
                        let counted = source.count_messages(&self.board_id).await;
                        match counted {
                            Ok(total) => {
                                tracing::info!("Board {} holds {} ideas", self.board_id, total);
                                self.total = Some(total);
                            }
                            Err(e) => return self.fail(e),
                        }
                    }
                    self.transition(ExtractionState::Fetching);
                }

                ExtractionState::Fetching => {
                    if self.limit_reached() {
                        self.transition(ExtractionState::LimitReached);
                        continue;
                    }

                    if let Some(raw) = self.buffer.pop_front() {
                        let processed = self.process(raw).await;
                        match processed {
                            Ok(Some(idea)) => {
                                self.yielded += 1;
                                return Ok(Some(idea));
                            }
                            Ok(None) => continue,
                            Err(e) => return self.fail(e),
                        }
                    }

                    if self.pages_fetched > 0 && self.cursor.is_none() {
                        self.transition(ExtractionState::Exhausted);
                        continue;
                    }

                    let fetched = self.fetch_next_page().await;
                    if let Err(e) = fetched {
                        return self.fail(e);
                    }
                }
            }
        }
    }

    /// Drains the run into a vector
    pub async fn collect_all(&mut self) -> Result<Vec<Idea>> {
        let mut ideas = Vec::new();
        while let Some(idea) = self.next_record().await? {
            ideas.push(idea);
        }
        Ok(ideas)
    }

    fn limit_reached(&self) -> bool {
        self.options
            .max_items
            .map_or(false, |max| self.yielded >= max)
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let source = self.source;
        let page = source
            .fetch_page(&self.board_id, self.cursor.as_ref(), self.options.batch_size)
            .await?;

        self.pages_fetched += 1;
        self.items_fetched += page.items.len();

        // An empty page ends the run even if the server sent a cursor
        self.cursor = if page.items.is_empty() {
            None
        } else {
            page.next_cursor
        };
        self.buffer.extend(page.items);

        let progress = Progress {
            pages_fetched: self.pages_fetched,
            items_fetched: self.items_fetched,
            total: self.total,
        };
        tracing::debug!(
            "Page {}: {} items fetched so far",
            progress.pages_fetched,
            progress.items_fetched
        );
        if let Some(callback) = self.progress.as_mut() {
            callback(&progress);
        }

        self.transition(ExtractionState::Fetching);
        Ok(())
    }

    /// Normalizes, filters and completes one raw record
    async fn process(&mut self, raw: Value) -> Result<Option<Idea>> {
        let idea = normalize_idea(&raw, &self.board_id);

        if !idea.id.is_empty() && !self.seen.insert(idea.id.clone()) {
            tracing::debug!("Skipping duplicate record {}", idea.id);
            return Ok(None);
        }

        if !self.options.accepts(idea.reply_count) {
            tracing::trace!(
                "Filtered out {} ({} replies)",
                idea.id,
                idea.reply_count
            );
            return Ok(None);
        }

        let source = self.source;

        let idea = if self.options.enrich && !idea.id.is_empty() {
            let full = source.fetch_message(&idea.id).await?;
            enrich(idea, &full)
        } else {
            idea
        };

        let idea = if self.options.replies_per_item > 0 && !idea.id.is_empty() {
            let raw_replies = source
                .fetch_replies(&idea.id, self.options.replies_per_item)
                .await?;
            let replies = raw_replies
                .iter()
                .map(|reply| normalize_reply(reply, &idea.id))
                .collect();
            idea.with_replies(replies)
        } else {
            idea
        };

        Ok(Some(idea))
    }

    fn transition(&mut self, next: ExtractionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid extraction transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("Extraction state {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail<T>(&mut self, error: ForumError) -> Result<T> {
        tracing::error!("Extraction of {} failed: {}", self.board_id, error);
        self.transition(ExtractionState::Failed);
        self.buffer.clear();
        Err(error)
    }
}
