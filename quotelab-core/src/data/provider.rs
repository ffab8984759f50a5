//! Series fetcher trait, request parameters and transport errors.
//!
//! The `SeriesFetcher` trait abstracts over the remote API so the aggregator
//! can be driven by the HTTP client in production and by scripted responses
//! in tests.

use super::series::IndicatorKind;
use crate::config::{IndicatorParams, OutputSize, SeriesType};
use serde_json::Value;
use thiserror::Error;

/// Transport-level failures. Provider notices (rate limit, unknown symbol)
/// arrive as successful responses and are not errors at this layer.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} with unparseable body")]
    HttpStatus { status: u16 },

    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),
}

/// Decoded JSON body of one provider call.
///
/// Holds whatever the provider sent back: a data payload, a rate-limit note,
/// or an error message. Telling those apart is the normalizer's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse(Value);

impl RawResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body)
            .map(Self)
            .map_err(|e| FetchError::MalformedBody(e.to_string()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Query parameters for one provider call, minus the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub function: &'static str,
    pub symbol: String,
    pub interval: Option<&'static str>,
    pub time_period: Option<u32>,
    pub series_type: Option<SeriesType>,
    pub output_size: Option<OutputSize>,
    pub fast_period: Option<u32>,
    pub slow_period: Option<u32>,
    pub signal_period: Option<u32>,
}

impl SeriesRequest {
    fn bare(function: &'static str, symbol: &str) -> Self {
        Self {
            function,
            symbol: symbol.to_string(),
            interval: None,
            time_period: None,
            series_type: None,
            output_size: None,
            fast_period: None,
            slow_period: None,
            signal_period: None,
        }
    }

    /// Build the request for one indicator kind.
    pub fn for_kind(
        kind: IndicatorKind,
        symbol: &str,
        params: &IndicatorParams,
        output_size: OutputSize,
    ) -> Self {
        let mut req = Self::bare(kind.function(), symbol);
        match kind {
            IndicatorKind::PriceVolume => {
                req.output_size = Some(output_size);
            }
            IndicatorKind::Rsi => {
                req.interval = Some("daily");
                req.time_period = Some(params.rsi_period);
                req.series_type = Some(params.rsi_series_type);
            }
            IndicatorKind::Macd => {
                req.interval = Some("daily");
                req.series_type = Some(params.macd_series_type);
                req.fast_period = params.macd_fast_period;
                req.slow_period = params.macd_slow_period;
                req.signal_period = params.macd_signal_period;
            }
            IndicatorKind::Sma => {
                req.interval = Some("daily");
                req.time_period = Some(params.sma_period);
                req.series_type = Some(params.sma_series_type);
            }
        }
        req
    }

    /// Render as ordered query pairs. Unset parameters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("function", self.function.to_string()),
            ("symbol", self.symbol.clone()),
        ];
        if let Some(interval) = self.interval {
            pairs.push(("interval", interval.to_string()));
        }
        if let Some(period) = self.time_period {
            pairs.push(("time_period", period.to_string()));
        }
        if let Some(series_type) = self.series_type {
            pairs.push(("series_type", series_type.as_str().to_string()));
        }
        if let Some(size) = self.output_size {
            pairs.push(("outputsize", size.as_str().to_string()));
        }
        if let Some(p) = self.fast_period {
            pairs.push(("fastperiod", p.to_string()));
        }
        if let Some(p) = self.slow_period {
            pairs.push(("slowperiod", p.to_string()));
        }
        if let Some(p) = self.signal_period {
            pairs.push(("signalperiod", p.to_string()));
        }
        pairs
    }
}

/// Anything that can execute a [`SeriesRequest`].
///
/// Implementations issue exactly one outbound call per `fetch` and do not
/// retry or cache.
pub trait SeriesFetcher {
    /// Human-readable name of this fetcher.
    fn name(&self) -> &str;

    fn fetch(&self, request: &SeriesRequest) -> Result<RawResponse, FetchError>;
}

impl<F: SeriesFetcher + ?Sized> SeriesFetcher for &F {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<RawResponse, FetchError> {
        (**self).fetch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(req: &SeriesRequest) -> Vec<&'static str> {
        req.query_pairs().into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn price_request_asks_for_output_size_only() {
        let req = SeriesRequest::for_kind(
            IndicatorKind::PriceVolume,
            "IBM",
            &IndicatorParams::default(),
            OutputSize::Compact,
        );
        assert_eq!(
            req.query_pairs(),
            vec![
                ("function", "TIME_SERIES_DAILY".to_string()),
                ("symbol", "IBM".to_string()),
                ("outputsize", "compact".to_string()),
            ]
        );
    }

    #[test]
    fn rsi_and_sma_requests_carry_period_and_series_type() {
        let params = IndicatorParams::default();
        let rsi = SeriesRequest::for_kind(IndicatorKind::Rsi, "IBM", &params, OutputSize::Full);
        assert_eq!(rsi.function, "RSI");
        assert_eq!(rsi.time_period, Some(14));
        assert_eq!(
            keys(&rsi),
            vec!["function", "symbol", "interval", "time_period", "series_type"]
        );

        let sma = SeriesRequest::for_kind(IndicatorKind::Sma, "IBM", &params, OutputSize::Full);
        assert_eq!(sma.time_period, Some(20));
        assert!(sma.output_size.is_none());
    }

    #[test]
    fn macd_request_has_no_time_period_but_passes_overrides() {
        let mut params = IndicatorParams::default();
        let macd = SeriesRequest::for_kind(IndicatorKind::Macd, "IBM", &params, OutputSize::Compact);
        assert_eq!(keys(&macd), vec!["function", "symbol", "interval", "series_type"]);

        params.macd_fast_period = Some(5);
        params.macd_signal_period = Some(3);
        let macd = SeriesRequest::for_kind(IndicatorKind::Macd, "IBM", &params, OutputSize::Compact);
        let pairs = macd.query_pairs();
        assert!(pairs.contains(&("fastperiod", "5".to_string())));
        assert!(pairs.contains(&("signalperiod", "3".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "slowperiod"));
    }

    #[test]
    fn raw_response_parse_rejects_non_json() {
        assert!(RawResponse::parse(r#"{"Note": "slow down"}"#).is_ok());
        assert!(matches!(
            RawResponse::parse("<html>busy</html>"),
            Err(FetchError::MalformedBody(_))
        ));
    }
}
