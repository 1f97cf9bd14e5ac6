//! alternative.me Fear & Greed feed provider.
//!
//! Fetches daily index readings from `https://api.alternative.me/fng/`.
//! Handles retries with exponential backoff, response parsing, and the
//! circuit breaker. `limit=0` returns the full history.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, FeedProvider, RawFeedRecord};
use crate::config::FeedConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// `GET /fng/?limit=N&format=json` response body.
#[derive(Debug, Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Option<Vec<RawFeedRecord>>,
    #[serde(default)]
    metadata: Option<FngMetadata>,
}

#[derive(Debug, Deserialize)]
struct FngMetadata {
    error: Option<String>,
}

pub struct AlternativeMeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl AlternativeMeProvider {
    /// Provider sharing `circuit_breaker` with other clients of the feed.
    pub fn new(
        config: &FeedConfig,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("fngband/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            circuit_breaker,
            max_retries: config.max_retries,
            base_delay: config.base_delay(),
        })
    }

    /// Provider with its own breaker built from the config.
    pub fn from_config(config: &FeedConfig) -> Result<Self, DataError> {
        let breaker = Arc::new(CircuitBreaker::new(
            config.breaker_cooldown(),
            config.breaker_failure_threshold,
        ));
        Self::new(config, breaker)
    }

    fn history_url(&self, limit: usize) -> String {
        format!("{}?limit={limit}&format=json", self.base_url)
    }

    fn parse_response(resp: FngResponse) -> Result<Vec<RawFeedRecord>, DataError> {
        if let Some(err) = resp.metadata.and_then(|m| m.error) {
            return Err(DataError::FeedError(err));
        }
        resp.data
            .ok_or_else(|| DataError::ResponseFormatChanged("missing 'data' array".into()))
    }

    fn fetch_with_retry(&self, limit: usize) -> Result<Vec<RawFeedRecord>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = self.history_url(limit);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying feed request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!(attempt, error = %e, "feed unreachable");
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status.is_server_error() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} from feed")));
                continue;
            }

            if !status.is_success() {
                return Err(DataError::Other(format!("HTTP {status} from feed")));
            }

            let body: FngResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse feed response: {e}"))
            })?;

            let records = Self::parse_response(body)?;
            self.circuit_breaker.record_success();
            debug!(limit, rows = records.len(), "feed fetch complete");
            return Ok(records);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl FeedProvider for AlternativeMeProvider {
    fn name(&self) -> &str {
        "alternative.me"
    }

    fn fetch(&self, limit: usize) -> Result<Vec<RawFeedRecord>, DataError> {
        self.fetch_with_retry(limit)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
