//! Session configuration.
//!
//! All tunables are explicit; the client reads no environment variables.
//! `Default` is the production setup: the live endpoint, a 5 second poll
//! delay and an unbounded pending loop.

use std::time::Duration;

use adlens_core::{AdlensError, AdlensResult};

/// Production report endpoint.
pub const DEFAULT_BASE_URL: &str = "https://rtapi.ruten.com.tw/api/ai/v1/market_analy";

/// Delay between pending-poll retries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Per-request timeout for the HTTP backend.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Acquisition tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    /// Terminal failure after this many pending responses. `None` polls
    /// until the report settles.
    pub max_poll_attempts: Option<u32>,
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Validate a session configuration.
pub fn validate_config(cfg: &SessionConfig) -> AdlensResult<()> {
    if url::Url::parse(&cfg.base_url).is_err() {
        return Err(AdlensError::invalid_argument(
            "base_url must be an absolute URL",
        ));
    }

    if cfg.poll_interval.is_zero() {
        return Err(AdlensError::invalid_argument(
            "poll_interval must be greater than zero",
        ));
    }

    if cfg.request_timeout.is_zero() {
        return Err(AdlensError::invalid_argument(
            "request_timeout must be greater than zero",
        ));
    }

    if cfg.max_poll_attempts == Some(0) {
        return Err(AdlensError::invalid_argument(
            "max_poll_attempts must be at least one when set",
        ));
    }

    Ok(())
}
