use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Forum-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Search endpoint and request pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the community REST API (e.g. `https://forums.example.com/api/2.0`)
    #[serde(default = "default_base_url", rename = "base-url")]
    pub base_url: String,

    /// Per-request socket timeout (seconds)
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Fixed delay between the start of consecutive requests (milliseconds)
    #[serde(default = "default_request_delay_ms", rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Retries allowed after the first attempt of a request
    #[serde(default = "default_max_retries", rename = "max-retries")]
    pub max_retries: u32,

    /// Wait before the first retry; doubled for each further retry (milliseconds)
    #[serde(default = "default_backoff_base_ms", rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for the computed backoff (milliseconds)
    #[serde(default = "default_max_backoff_ms", rename = "max-backoff-ms")]
    pub max_backoff_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Client identification sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(default = "default_client_name", rename = "client-name")]
    pub client_name: String,

    /// Version of the client
    #[serde(default = "default_client_version", rename = "client-version")]
    pub client_version: String,

    /// URL with information about the client operator
    #[serde(default, rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the identifying client tag
    ///
    /// Format: `Name/Version (+ContactURL)` or `Name/Version (Research purposes)`
    pub fn user_agent(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.client_name, self.client_version, contact),
            None => format!("{}/{} (Research purposes)", self.client_name, self.client_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            client_version: default_client_version(),
            contact_url: None,
        }
    }
}

/// Extraction defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Board extracted when the CLI does not name one
    #[serde(default = "default_board_id", rename = "board-id")]
    pub board_id: String,

    /// Items requested per page (the endpoint caps this at 100)
    #[serde(default = "default_batch_size", rename = "batch-size")]
    pub batch_size: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            board_id: default_board_id(),
            batch_size: default_batch_size(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving JSON and CSV exports
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Character budget for body text in CSV rows
    #[serde(default = "default_csv_body_limit", rename = "csv-body-limit")]
    pub csv_body_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            csv_body_limit: default_csv_body_limit(),
        }
    }
}

fn default_base_url() -> String {
    "https://forums.autodesk.com/api/2.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    6
}

fn default_backoff_base_ms() -> u64 {
    800
}

fn default_max_backoff_ms() -> u64 {
    120_000
}

fn default_client_name() -> String {
    "Forum-Harvest".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_board_id() -> String {
    "acc-ideas-en".to_string()
}

fn default_batch_size() -> u32 {
    100
}

fn default_directory() -> String {
    "forum_data".to_string()
}

fn default_csv_body_limit() -> usize {
    500
}
