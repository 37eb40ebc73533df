use std::time::Duration;

use serde::Serialize;

use crate::ConfigError;

/// User-Agent sent with every review request when none is configured.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Immutable per-job settings for the review pipeline.
///
/// Built once at startup (see [`crate::env::load_fetch_config`]), validated,
/// then shared read-only by every worker for the life of the run.
#[derive(Debug, Clone, Serialize)]
pub struct FetchConfig {
    /// Number of products processed together before the inter-batch delay.
    pub batch_size: usize,
    /// Upper bound on concurrently running per-product fetch tasks.
    pub max_workers: usize,
    /// Reviews requested per page.
    pub page_size: u32,
    /// Pause between consecutive batches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Retry attempts after the initial request before giving up.
    pub retry_total: u32,
    /// Base backoff in milliseconds; retry attempt `n` waits `base * 2^n`.
    pub backoff_base_ms: u64,
    /// Connection pools the transport may keep open.
    pub pool_connections: usize,
    /// Idle connections retained per host.
    pub pool_max_size: usize,
    /// Hard cap on pages fetched per product; `None` paginates to exhaustion.
    pub max_pages: Option<u32>,
    /// User-Agent header sent with every review request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            batch_size: 25,
            max_workers: 8,
            page_size: 10,
            batch_delay_ms: 2000,
            request_timeout_secs: 20,
            retry_total: 5,
            backoff_base_ms: 500,
            pool_connections: 50,
            pool_max_size: 50,
            max_pages: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Check that every field is inside its legal range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(ConfigError::Validation(
                "max_workers must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Validation(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.pool_connections == 0 {
            return Err(ConfigError::Validation(
                "pool_connections must be greater than zero".to_string(),
            ));
        }
        if self.pool_max_size == 0 {
            return Err(ConfigError::Validation(
                "pool_max_size must be greater than zero".to_string(),
            ));
        }
        if self.max_pages == Some(0) {
            return Err(ConfigError::Validation(
                "max_pages must be greater than zero when set".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
