use crate::config::types::{ApiConfig, Config, ExtractConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates endpoint and pacing settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.request_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request-delay-ms must be >= 100ms, got {}ms",
            config.request_delay_ms
        )));
    }

    if config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 20, got {}",
            config.max_retries
        )));
    }

    if config.backoff_base_ms == 0 {
        return Err(ConfigError::Validation(
            "backoff-base-ms must be > 0".to_string(),
        ));
    }

    if config.max_backoff_ms < config.backoff_base_ms {
        return Err(ConfigError::Validation(format!(
            "max-backoff-ms ({}) must be >= backoff-base-ms ({})",
            config.max_backoff_ms, config.backoff_base_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client-name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates extraction defaults
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    validate_board_id(&config.board_id)?;

    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.csv_body_limit == 0 {
        return Err(ConfigError::Validation(
            "csv-body-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates a board identifier
///
/// Board ids are interpolated into query literals, so only a conservative
/// character set is accepted.
pub fn validate_board_id(board_id: &str) -> Result<(), ConfigError> {
    if board_id.is_empty() {
        return Err(ConfigError::Validation(
            "board-id cannot be empty".to_string(),
        ));
    }

    if !board_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "board-id '{}' may only contain ASCII letters, digits, '-' and '_'",
            board_id
        )));
    }

    Ok(())
}
