//! Alpha Vantage HTTP fetcher.
//!
//! One blocking GET per call against the `query` endpoint. The credential is
//! injected at construction and appended to every request. Rate-limit and
//! "invalid call" notices come back as HTTP 200 with a JSON body, so they pass
//! straight through to the normalizer.

use super::provider::{FetchError, RawResponse, SeriesFetcher, SeriesRequest};
use crate::config::{ApiKey, ProviderConfig};
use std::time::Duration;
use tracing::debug;

/// Alpha Vantage data provider.
pub struct AlphaVantageClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: ApiKey,
}

impl AlphaVantageClient {
    pub fn new(api_key: ApiKey, settings: &ProviderConfig) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, settings.base_url.clone(), settings.timeout())
    }

    pub fn with_base_url(
        api_key: ApiKey,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quotelab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a transport error without leaking the query string (it holds the key).
    fn transport_error(err: reqwest::Error) -> FetchError {
        let timed_out = err.is_timeout();
        let message = err.without_url().to_string();
        if timed_out {
            FetchError::Timeout(message)
        } else {
            FetchError::Network(message)
        }
    }

    /// Decide what a completed HTTP exchange means.
    ///
    /// A JSON body is always returned to the caller, even on a non-2xx status.
    fn interpret(status: reqwest::StatusCode, body: &str) -> Result<RawResponse, FetchError> {
        match RawResponse::parse(body) {
            Ok(raw) => {
                if !status.is_success() {
                    debug!(%status, "provider returned a JSON body with a non-success status");
                }
                Ok(raw)
            }
            Err(err) if status.is_success() => Err(err),
            Err(_) => Err(FetchError::HttpStatus {
                status: status.as_u16(),
            }),
        }
    }
}

impl SeriesFetcher for AlphaVantageClient {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<RawResponse, FetchError> {
        if request.symbol.trim().is_empty() {
            return Err(FetchError::InvalidRequest("symbol must not be empty".into()));
        }

        let mut query = request.query_pairs();
        debug!(function = request.function, symbol = %request.symbol, ?query, "requesting series");
        query.push(("apikey", self.api_key.expose().to_string()));

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .map_err(Self::transport_error)?;

        let status = resp.status();
        let body = resp.text().map_err(Self::transport_error)?;
        Self::interpret(status, &body)
    }
}
