//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the client, including:
//! - Building the HTTP client with the identifying user agent
//! - Retry logic for transient failures with exponential backoff
//! - Honoring `Retry-After` hints
//! - A fixed delay between consecutive requests
//! - Error classification

use crate::client::query_preview;
use crate::config::{ApiConfig, UserAgentConfig};
use crate::{ForumError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use forum_harvest::config::{ApiConfig, UserAgentConfig};
/// use forum_harvest::client::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &ApiConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    api: &ApiConfig,
) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(user_agent.user_agent())
        .default_headers(headers)
        .timeout(api.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for statuses that are retried with backoff
///
/// | Status | Action |
/// |--------|--------|
/// | 429 | Retry, honoring `Retry-After` |
/// | 500, 502, 503, 504 | Retry with backoff |
/// | anything else non-2xx | Fail immediately |
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Reads a `Retry-After` header given either as delta-seconds or as an HTTP date
///
/// Dates in the past yield a zero wait.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let remaining = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(remaining.to_std().unwrap_or(Duration::ZERO))
}

/// Retry budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    /// Wait before the first retry
    pub backoff_base: Duration,

    /// Ceiling for the computed backoff
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(api: &ApiConfig) -> Self {
        Self {
            max_retries: api.max_retries,
            backoff_base: api.backoff_base(),
            max_backoff: api.max_backoff(),
        }
    }

    /// Wait before the given retry (1-based): `base * 2^(retry - 1)`, capped
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_base
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Enforces a fixed pause between the end of one request and the start of the next
#[derive(Debug)]
pub(crate) struct Throttle {
    delay: Duration,
    next_slot: Mutex<Option<Instant>>,
}

/// Held for the duration of one request; releasing it starts the pause
#[derive(Debug)]
pub(crate) struct ThrottleSlot<'a> {
    throttle: &'a Throttle,
}

impl Throttle {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    /// Sleeps until the pause after the previous request has elapsed
    pub(crate) async fn acquire(&self) -> ThrottleSlot<'_> {
        let wait = {
            let next_slot = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
            next_slot.map_or(Duration::ZERO, |slot| {
                slot.saturating_duration_since(Instant::now())
            })
        };

        if !wait.is_zero() {
            tracing::trace!("Throttling request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        ThrottleSlot { throttle: self }
    }

    fn release(&self) {
        let mut next_slot = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        *next_slot = Some(Instant::now() + self.delay);
    }
}

impl Drop for ThrottleSlot<'_> {
    fn drop(&mut self) {
        self.throttle.release();
    }
}

/// Outcome of a single attempt
enum Attempt {
    Done(String),
    Retry { status: Option<u16>, wait: Option<Duration> },
}

/// Issues a GET with throttling and retries, returning the body of the first 2xx response
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 429/500/502/503/504 | Retry with backoff, `Retry-After` wins |
/// | Timeout, connection failure | Retry with backoff |
/// | Other HTTP status | Immediate `HttpStatus` error |
/// | Retries exhausted | `Transient` or `Network` error |
///
/// `label` is the query text (or resource path) quoted in errors.
pub(crate) async fn get_with_retry(
    client: &Client,
    throttle: &Throttle,
    policy: &RetryPolicy,
    url: &Url,
    label: &str,
) -> Result<String> {
    let mut retries = 0u32;

    loop {
        let attempts = retries + 1;

        // The slot is released once the response is read or the attempt fails
        let slot = throttle.acquire().await;
        let outcome = match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    match response.text().await {
                        Ok(body) => Attempt::Done(body),
                        Err(e) if retries < policy.max_retries => {
                            tracing::warn!("Failed reading response body: {}", e);
                            Attempt::Retry { status: None, wait: None }
                        }
                        Err(e) => {
                            return Err(ForumError::Network {
                                attempts,
                                query: query_preview(label),
                                source: e,
                            })
                        }
                    }
                } else if is_retryable_status(status) {
                    if retries >= policy.max_retries {
                        return Err(ForumError::Transient {
                            status: status.as_u16(),
                            attempts,
                            query: query_preview(label),
                        });
                    }
                    Attempt::Retry {
                        status: Some(status.as_u16()),
                        wait: parse_retry_after(response.headers()),
                    }
                } else {
                    return Err(ForumError::HttpStatus {
                        status: status.as_u16(),
                        query: query_preview(label),
                    });
                }
            }
            Err(e) => {
                let retryable = e.is_timeout() || e.is_connect() || e.is_request();
                if !retryable || retries >= policy.max_retries {
                    return Err(ForumError::Network {
                        attempts,
                        query: query_preview(label),
                        source: e,
                    });
                }
                tracing::warn!("Request error: {}", e);
                Attempt::Retry { status: None, wait: None }
            }
        };
        drop(slot);

        match outcome {
            Attempt::Done(body) => return Ok(body),
            Attempt::Retry { status, wait } => {
                retries += 1;
                let wait = wait.unwrap_or_else(|| policy.backoff_for(retries));
                tracing::warn!(
                    "Retry {}/{} in {:?} (status: {})",
                    retries,
                    policy.max_retries,
                    wait,
                    status.map_or_else(|| "network".to_string(), |s| s.to_string())
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}
