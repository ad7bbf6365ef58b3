//! Fetch backend.
//!
//! The session drives acquisition through the `FetchBackend` trait so tests
//! can script responses. `HttpBackend` is the production implementation: one
//! GET per attempt against the configured endpoint, anything non-2xx is a
//! transport failure.

use std::future::Future;

use serde_json::Value;

use adlens_core::{AdlensError, AdlensResult};

use crate::config::SessionConfig;

/// Result of one fetch attempt. Failures are data, not errors: the session
/// turns them into committed error blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 2xx response with a JSON body.
    Success(Value),
    /// Non-2xx response status.
    Transport { status: u16 },
    /// Network failure or an unreadable body.
    Failed { detail: String },
}

/// Source of raw report documents.
pub trait FetchBackend {
    fn fetch_report(&self, seller: &str, date: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// reqwest-backed production fetcher.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &SessionConfig) -> AdlensResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdlensError::invalid_argument(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl FetchBackend for HttpBackend {
    async fn fetch_report(&self, seller: &str, date: &str) -> FetchOutcome {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("seller", seller), ("date", date)]);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return FetchOutcome::Failed { detail: e.to_string() },
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Transport {
                status: status.as_u16(),
            };
        }

        match response.json::<Value>().await {
            Ok(doc) => FetchOutcome::Success(doc),
            Err(e) => FetchOutcome::Failed { detail: e.to_string() },
        }
    }
}
