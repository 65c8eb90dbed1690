//! Integration tests for the extraction driver
//!
//! Most tests drive pagination from an in-memory source so page counts and
//! request patterns can be asserted exactly. The last test runs a full
//! extraction and export against a wiremock server.

use forum_harvest::client::{Cursor, ForumClient, ForumSource, Page, Query};
use forum_harvest::config::{ApiConfig, UserAgentConfig};
use forum_harvest::extract::{extract_all, ExtractOptions, Extraction, ExtractionState, Progress};
use forum_harvest::output::{save_to_csv, save_to_json};
use forum_harvest::{ForumError, Result};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Raw idea record with the given conversation size
fn raw_idea(id: &str, kudos: i64, messages_count: i64) -> Value {
    json!({
        "id": id,
        "subject": format!("Idea {}", id),
        "body": format!("<p>Body of <b>{}</b></p>", id),
        "kudos": {"sum": {"weight": kudos}},
        "conversation": {"messages_count": messages_count}
    })
}

/// In-memory forum serving fixed pages, addressed by cursors `p1`, `p2`, ...
#[derive(Default)]
struct FakeSource {
    pages: Vec<Vec<Value>>,
    /// Serve generated pages forever instead of `pages`
    unbounded: bool,
    fail_on_page: Option<usize>,
    total: u64,
    page_requests: Cell<usize>,
    count_requests: Cell<usize>,
    reply_requests: RefCell<Vec<(String, u32)>>,
    message_requests: RefCell<Vec<String>>,
}

impl FakeSource {
    fn with_pages(pages: Vec<Vec<Value>>) -> Self {
        let total = pages.iter().map(|p| p.len() as u64).sum();
        Self {
            pages,
            total,
            ..Self::default()
        }
    }

    fn unbounded() -> Self {
        Self {
            unbounded: true,
            total: 1_000_000,
            ..Self::default()
        }
    }
}

impl ForumSource for FakeSource {
    async fn fetch_page(&self, _board_id: &str, cursor: Option<&Cursor>, limit: u32) -> Result<Page> {
        let index = cursor
            .and_then(|c| c.as_str().strip_prefix('p'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        self.page_requests.set(self.page_requests.get() + 1);

        if self.fail_on_page == Some(index) {
            return Err(ForumError::Transient {
                status: 503,
                attempts: 7,
                query: format!("page {}", index),
            });
        }

        if self.unbounded {
            let items = (0..limit)
                .map(|j| raw_idea(&format!("{}-{}", index, j), 1000 - j as i64, 1))
                .collect();
            return Ok(Page {
                items,
                next_cursor: Some(Cursor::new(format!("p{}", index + 1))),
            });
        }

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < self.pages.len()).then(|| Cursor::new(format!("p{}", index + 1)));
        Ok(Page { items, next_cursor })
    }

    async fn count_messages(&self, _board_id: &str) -> Result<u64> {
        self.count_requests.set(self.count_requests.get() + 1);
        Ok(self.total)
    }

    async fn fetch_replies(&self, parent_id: &str, limit: u32) -> Result<Vec<Value>> {
        self.reply_requests
            .borrow_mut()
            .push((parent_id.to_string(), limit));
        Ok((0..limit)
            .map(|k| {
                json!({
                    "id": format!("{}-r{}", parent_id, k),
                    "body": "<div>Thanks<br>+1</div>",
                    "author": {"login": "replier", "id": "9"}
                })
            })
            .collect())
    }

    async fn fetch_message(&self, message_id: &str) -> Result<Value> {
        self.message_requests
            .borrow_mut()
            .push(message_id.to_string());
        Ok(json!({
            "id": message_id,
            "status": {"key": "accepted", "name": "Accepted"},
            "conversation": {"solved": true}
        }))
    }
}

fn ids(ideas: &[forum_harvest::Idea]) -> Vec<&str> {
    ideas.iter().map(|idea| idea.id.as_str()).collect()
}

#[tokio::test]
async fn test_all_pages_in_server_order() {
    let source = FakeSource::with_pages(vec![
        vec![raw_idea("1", 60, 1), raw_idea("2", 50, 1)],
        vec![raw_idea("3", 40, 1), raw_idea("4", 30, 1)],
        vec![raw_idea("5", 20, 1), raw_idea("6", 10, 1)],
    ]);

    let mut extraction = Extraction::new(&source, "board", ExtractOptions::default());
    assert_eq!(extraction.state(), ExtractionState::Init);

    let ideas = extraction.collect_all().await.expect("extraction should succeed");

    assert_eq!(ids(&ideas), vec!["1", "2", "3", "4", "5", "6"]);
    assert_eq!(extraction.state(), ExtractionState::Done);
    assert_eq!(extraction.pages_fetched(), 3);
    assert_eq!(source.page_requests.get(), 3);
    assert!(ideas.iter().all(|idea| idea.replies.is_none()));
    assert_eq!(ideas[0].body_text, "Body of 1");
}

#[tokio::test]
async fn test_reply_count_filters() {
    let source = FakeSource::with_pages(vec![vec![
        raw_idea("a", 9, 1),
        raw_idea("b", 8, 2),
        raw_idea("c", 7, 3),
        raw_idea("d", 6, 4),
        raw_idea("e", 5, 0),
    ]]);

    let options = ExtractOptions {
        min_replies: Some(2),
        ..ExtractOptions::default()
    };
    let ideas = extract_all(&source, "board", options).await.unwrap();
    assert_eq!(ids(&ideas), vec!["c", "d"]);
    assert_eq!(ideas[0].reply_count, 2);

    let options = ExtractOptions {
        max_replies: Some(0),
        ..ExtractOptions::default()
    };
    let ideas = extract_all(&source, "board", options).await.unwrap();
    assert_eq!(ids(&ideas), vec!["a", "e"]);
}

#[tokio::test]
async fn test_max_items_stops_requesting_pages() {
    let source = FakeSource::unbounded();
    let options = ExtractOptions {
        max_items: Some(5),
        batch_size: 2,
        ..ExtractOptions::default()
    };

    let mut extraction = Extraction::new(&source, "board", options);
    let ideas = extraction.collect_all().await.unwrap();

    assert_eq!(ideas.len(), 5);
    assert_eq!(source.page_requests.get(), 3);
    assert_eq!(extraction.state(), ExtractionState::Done);

    assert!(extraction.next_record().await.unwrap().is_none());
    assert_eq!(source.page_requests.get(), 3);
}

#[tokio::test]
async fn test_zero_limit_issues_no_requests() {
    let source = FakeSource::unbounded();
    let options = ExtractOptions {
        max_items: Some(0),
        ..ExtractOptions::default()
    };

    let ideas = extract_all(&source, "board", options).await.unwrap();

    assert!(ideas.is_empty());
    assert_eq!(source.page_requests.get(), 0);
}

#[tokio::test]
async fn test_pulls_lazily() {
    let source = FakeSource::unbounded();
    let options = ExtractOptions {
        batch_size: 10,
        ..ExtractOptions::default()
    };

    let mut extraction = Extraction::new(&source, "board", options);
    let first = extraction.next_record().await.unwrap().expect("one record");

    assert_eq!(first.id, "0-0");
    assert_eq!(extraction.state(), ExtractionState::Fetching);
    assert_eq!(source.page_requests.get(), 1);

    for _ in 0..9 {
        extraction.next_record().await.unwrap();
    }
    assert_eq!(source.page_requests.get(), 1);

    extraction.next_record().await.unwrap();
    assert_eq!(source.page_requests.get(), 2);
}

#[tokio::test]
async fn test_duplicates_across_pages_are_skipped() {
    let source = FakeSource::with_pages(vec![
        vec![raw_idea("a", 3, 1), raw_idea("b", 2, 1)],
        vec![raw_idea("b", 2, 1), raw_idea("c", 1, 1)],
    ]);

    let ideas = extract_all(&source, "board", ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&ideas), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_empty_page_ends_run() {
    let source = FakeSource::with_pages(vec![
        vec![raw_idea("a", 3, 1)],
        vec![],
        vec![raw_idea("never", 1, 1)],
    ]);

    let mut extraction = Extraction::new(&source, "board", ExtractOptions::default());
    let ideas = extraction.collect_all().await.unwrap();

    assert_eq!(ids(&ideas), vec!["a"]);
    assert_eq!(source.page_requests.get(), 2);
    assert_eq!(extraction.state(), ExtractionState::Done);
}

#[tokio::test]
async fn test_failure_moves_to_failed() {
    let source = FakeSource {
        fail_on_page: Some(1),
        ..FakeSource::with_pages(vec![
            vec![raw_idea("a", 2, 1), raw_idea("b", 1, 1)],
            vec![raw_idea("c", 0, 1)],
        ])
    };

    let mut extraction = Extraction::new(&source, "board", ExtractOptions::default());
    assert!(extraction.next_record().await.unwrap().is_some());
    assert!(extraction.next_record().await.unwrap().is_some());

    let err = extraction.next_record().await.expect_err("second page fails");
    assert!(err.is_transient());
    assert_eq!(extraction.state(), ExtractionState::Failed);

    assert!(extraction.next_record().await.unwrap().is_none());
    assert_eq!(source.page_requests.get(), 2);
}

#[tokio::test]
async fn test_failure_aborts_extract_all() {
    let source = FakeSource {
        fail_on_page: Some(0),
        ..FakeSource::with_pages(vec![vec![raw_idea("a", 1, 1)]])
    };

    let result = extract_all(&source, "board", ExtractOptions::default()).await;
    assert!(matches!(result, Err(ForumError::Transient { status: 503, .. })));
}

#[tokio::test]
async fn test_progress_once_per_page() {
    let source = FakeSource::with_pages(vec![
        vec![raw_idea("1", 6, 1), raw_idea("2", 5, 1)],
        vec![raw_idea("3", 4, 1), raw_idea("4", 3, 1)],
        vec![raw_idea("5", 2, 1), raw_idea("6", 1, 1)],
    ]);

    let mut reports: Vec<Progress> = Vec::new();
    {
        let mut extraction = Extraction::new(&source, "board", ExtractOptions::default())
            .with_progress(|progress: &Progress| reports.push(*progress));
        extraction.collect_all().await.unwrap();
        assert_eq!(extraction.total(), Some(6));
    }

    assert_eq!(source.count_requests.get(), 1);
    assert_eq!(reports.len(), 3);
    assert_eq!(
        reports.iter().map(|p| p.items_fetched).collect::<Vec<_>>(),
        vec![2, 4, 6]
    );
    assert_eq!(reports[2].pages_fetched, 3);
    assert!(reports.iter().all(|p| p.total == Some(6)));
}

#[tokio::test]
async fn test_no_count_query_without_progress() {
    let source = FakeSource::with_pages(vec![vec![raw_idea("1", 1, 1)]]);

    let mut extraction = Extraction::new(&source, "board", ExtractOptions::default());
    extraction.collect_all().await.unwrap();

    assert_eq!(source.count_requests.get(), 0);
    assert_eq!(extraction.total(), None);
}

#[tokio::test]
async fn test_replies_fetched_for_accepted_records_only() {
    let source = FakeSource::with_pages(vec![vec![
        raw_idea("a", 3, 5),
        raw_idea("b", 2, 1),
        raw_idea("c", 1, 3),
    ]]);
    let options = ExtractOptions {
        min_replies: Some(1),
        replies_per_item: 2,
        ..ExtractOptions::default()
    };

    let ideas = extract_all(&source, "board", options).await.unwrap();

    assert_eq!(ids(&ideas), vec!["a", "c"]);
    assert_eq!(
        *source.reply_requests.borrow(),
        vec![("a".to_string(), 2), ("c".to_string(), 2)]
    );

    let replies = ideas[0].replies.as_ref().expect("replies attached");
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].id, "a-r0");
    assert_eq!(replies[0].parent_id, "a");
    assert_eq!(replies[0].author.as_deref(), Some("replier"));
    assert_eq!(replies[0].body_text, "Thanks\n+1");
}

#[tokio::test]
async fn test_enrich_refetches_each_record() {
    let source = FakeSource::with_pages(vec![vec![raw_idea("a", 3, 2), raw_idea("b", 2, 2)]]);
    let options = ExtractOptions {
        enrich: true,
        ..ExtractOptions::default()
    };

    let ideas = extract_all(&source, "board", options).await.unwrap();

    assert_eq!(*source.message_requests.borrow(), vec!["a", "b"]);
    assert_eq!(ideas[0].status_name.as_deref(), Some("Accepted"));
    assert!(ideas[0].solved);
    assert_eq!(ideas[0].reply_count, 1);
}

#[tokio::test]
async fn test_end_to_end_extraction_and_export() {
    let server = MockServer::start().await;
    let second = Cursor::new("next-1");

    Mock::given(method("GET"))
        .and(path("/api/2.0/search"))
        .and(query_param(
            "q",
            Query::ideas_page("acc-ideas-en", 2, None).to_string().as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "items": [raw_idea("100", 50, 4), raw_idea("101", 40, 1)],
                "next_cursor": "next-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/2.0/search"))
        .and(query_param(
            "q",
            Query::ideas_page("acc-ideas-en", 2, Some(&second))
                .to_string()
                .as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "items": [{
                    "id": "102",
                    "subject": "Long one",
                    "body": format!("<p>{}</p>", "é".repeat(800)),
                    "kudos": {"sum": {"weight": 30}},
                    "conversation": {"messages_count": 2}
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiConfig {
        base_url: format!("{}/api/2.0", server.uri()),
        request_delay_ms: 0,
        backoff_base_ms: 10,
        max_backoff_ms: 20,
        ..ApiConfig::default()
    };
    let client = ForumClient::new(&api, &UserAgentConfig::default()).expect("client");

    let options = ExtractOptions {
        batch_size: 2,
        ..ExtractOptions::default()
    };
    let ideas = extract_all(&client, "acc-ideas-en", options).await.unwrap();

    assert_eq!(ids(&ideas), vec!["100", "101", "102"]);
    assert_eq!(ideas[0].reply_count, 3);
    assert_eq!(ideas[1].reply_count, 0);
    assert!(ideas.iter().all(|idea| idea.board_id == "acc-ideas-en"));

    let dir = tempfile::tempdir().unwrap();
    let json_path = save_to_json(&ideas, dir.path(), "run.json").unwrap();
    let csv_path = save_to_csv(&ideas, dir.path(), "run.csv", 500)
        .unwrap()
        .expect("csv written");

    let exported: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[2]["body_text"].as_str().unwrap().chars().count(), 800);

    let mut reader = csv::Reader::from_path(csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert!(headers.iter().all(|h| h != "body_html" && h != "replies"));

    let body_column = headers.iter().position(|h| h == "body_text").unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][body_column].chars().count(), 500);
}
