//! Test helpers: a scripted in-memory fetcher and provider-shaped response builders.
//!
//! Used by the unit tests, the integration tests under `tests/`, and the benches.

use crate::data::{FetchError, RawResponse, SeriesFetcher, SeriesRequest};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;

/// Fetcher that answers each `function` with a canned result and records every request.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: HashMap<&'static str, Result<RawResponse, FetchError>>,
    requests: RefCell<Vec<SeriesRequest>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `function` with a JSON body.
    pub fn respond(mut self, function: &'static str, body: Value) -> Self {
        self.responses.insert(function, Ok(RawResponse::new(body)));
        self
    }

    /// Answer `function` with a transport failure.
    pub fn fail(mut self, function: &'static str, error: FetchError) -> Self {
        self.responses.insert(function, Err(error));
        self
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<SeriesRequest> {
        self.requests.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl SeriesFetcher for ScriptedFetcher {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<RawResponse, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .get(request.function)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Network(format!(
                    "no scripted response for {}",
                    request.function
                )))
            })
    }
}

fn dated_payload<F>(dates: impl IntoIterator<Item = NaiveDate>, entry: F) -> Value
where
    F: Fn(usize) -> Value,
{
    let mut map = Map::new();
    for (i, date) in dates.into_iter().enumerate() {
        map.insert(date.format("%Y-%m-%d").to_string(), entry(i));
    }
    Value::Object(map)
}

/// `TIME_SERIES_DAILY` body for the given closes; open/high/low derive from close.
pub fn daily_response(bars: &[(NaiveDate, f64)]) -> Value {
    let payload = dated_payload(bars.iter().map(|(d, _)| *d), |i| {
        let close = bars[i].1;
        json!({
            "1. open": format!("{:.4}", close - 0.5),
            "2. high": format!("{:.4}", close + 1.0),
            "3. low": format!("{:.4}", close - 1.0),
            "4. close": format!("{:.4}", close),
            "5. volume": format!("{}", 1_000_000 + i * 1000),
        })
    });
    json!({
        "Meta Data": { "1. Information": "Daily Prices (open, high, low, close) and Volumes" },
        "Time Series (Daily)": payload,
    })
}

/// Single-metric indicator body (`RSI` or `SMA`).
pub fn single_metric_response(function: &str, points: &[(NaiveDate, f64)]) -> Value {
    let payload = dated_payload(points.iter().map(|(d, _)| *d), |i| {
        json!({ function: format!("{:.4}", points[i].1) })
    });
    let mut body = Map::new();
    body.insert(format!("Technical Analysis: {function}"), payload);
    Value::Object(body)
}

/// `MACD` body; points are (date, macd, signal). The histogram is their difference.
pub fn macd_response(points: &[(NaiveDate, f64, f64)]) -> Value {
    let payload = dated_payload(points.iter().map(|(d, _, _)| *d), |i| {
        let (_, macd, signal) = points[i];
        json!({
            "MACD": format!("{macd:.4}"),
            "MACD_Signal": format!("{signal:.4}"),
            "MACD_Hist": format!("{:.4}", macd - signal),
        })
    });
    json!({ "Technical Analysis: MACD": payload })
}

/// Rate-limit note as the provider sends it.
pub fn rate_limit_note() -> Value {
    json!({
        "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute and 500 calls per day."
    })
}

/// Weekday trading dates starting at `start`, `count` of them.
pub fn trading_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    use chrono::{Datelike, Weekday};
    start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(count)
        .collect()
}
