//! Series normalizer.
//!
//! A raw response is decoded once into a [`ProviderPayload`], then turned into
//! an [`IndicatorSeries`] sorted ascending by date. Optional indicators whose
//! payload is missing normalize to an empty series; the price series does not.

use super::provider::RawResponse;
use super::series::{IndicatorKind, IndicatorSeries, TimeSeriesPoint};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Malformed content in an otherwise successfully fetched response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    #[error("{kind} payload missing from response: {detail}")]
    MissingPayload { kind: IndicatorKind, detail: String },

    #[error("{kind} payload has an unexpected shape: {reason}")]
    MalformedPayload { kind: IndicatorKind, reason: String },

    #[error("{kind}: unparseable date key '{key}'")]
    InvalidDate { kind: IndicatorKind, key: String },

    #[error("{kind}: field '{field}' missing on {date}")]
    MissingField {
        kind: IndicatorKind,
        date: String,
        field: &'static str,
    },

    #[error("{kind}: field '{field}' on {date} is not a finite number: '{value}'")]
    InvalidNumber {
        kind: IndicatorKind,
        date: String,
        field: &'static str,
        value: String,
    },

    #[error("{kind}: date {date} appears more than once")]
    DuplicateDate { kind: IndicatorKind, date: NaiveDate },
}

/// Date key → metric name → raw JSON value.
///
/// Metric values stay undecoded until a schema field asks for them, so a bad
/// value is reported with its date and field and unused keys are ignored.
pub type DatedEntries = BTreeMap<String, Map<String, Value>>;

/// Numeric value of a metric: a decimal string or a JSON number, finite only.
fn metric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Metric value as it appeared in the response, for error messages.
fn metric_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Non-data bodies the provider answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderNotice {
    /// Usually the per-minute call limit.
    Note(String),
    /// Daily limit, premium endpoint, or maintenance.
    Information(String),
    /// Invalid call: unknown symbol, bad parameter.
    ErrorMessage(String),
}

impl ProviderNotice {
    fn detect(body: &Map<String, Value>) -> Option<Self> {
        let text = |key: &str| {
            body.get(key).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        };
        text("Error Message")
            .map(ProviderNotice::ErrorMessage)
            .or_else(|| text("Note").map(ProviderNotice::Note))
            .or_else(|| text("Information").map(ProviderNotice::Information))
    }
}

impl fmt::Display for ProviderNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderNotice::Note(s) => write!(f, "note: {s}"),
            ProviderNotice::Information(s) => write!(f, "information: {s}"),
            ProviderNotice::ErrorMessage(s) => write!(f, "error message: {s}"),
        }
    }
}

/// A response body decoded by the payload it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    PriceVolume(DatedEntries),
    Rsi(DatedEntries),
    Macd(DatedEntries),
    Sma(DatedEntries),
    Unrecognized(Option<ProviderNotice>),
}

impl ProviderPayload {
    /// Decode a raw response. Only a recognised payload key with the wrong
    /// JSON shape is an error; anything else unknown is `Unrecognized`.
    pub fn decode(raw: &RawResponse) -> Result<Self, NormalizationError> {
        let Some(body) = raw.as_value().as_object() else {
            return Ok(ProviderPayload::Unrecognized(None));
        };

        for kind in [
            IndicatorKind::PriceVolume,
            IndicatorKind::Rsi,
            IndicatorKind::Macd,
            IndicatorKind::Sma,
        ] {
            if let Some(payload) = body.get(kind.payload_key()) {
                let entries = DatedEntries::deserialize(payload).map_err(|e| {
                    NormalizationError::MalformedPayload {
                        kind,
                        reason: e.to_string(),
                    }
                })?;
                return Ok(match kind {
                    IndicatorKind::PriceVolume => ProviderPayload::PriceVolume(entries),
                    IndicatorKind::Rsi => ProviderPayload::Rsi(entries),
                    IndicatorKind::Macd => ProviderPayload::Macd(entries),
                    IndicatorKind::Sma => ProviderPayload::Sma(entries),
                });
            }
        }

        Ok(ProviderPayload::Unrecognized(ProviderNotice::detect(body)))
    }

    pub fn kind(&self) -> Option<IndicatorKind> {
        match self {
            ProviderPayload::PriceVolume(_) => Some(IndicatorKind::PriceVolume),
            ProviderPayload::Rsi(_) => Some(IndicatorKind::Rsi),
            ProviderPayload::Macd(_) => Some(IndicatorKind::Macd),
            ProviderPayload::Sma(_) => Some(IndicatorKind::Sma),
            ProviderPayload::Unrecognized(_) => None,
        }
    }

    pub fn notice(&self) -> Option<&ProviderNotice> {
        match self {
            ProviderPayload::Unrecognized(notice) => notice.as_ref(),
            _ => None,
        }
    }

    fn into_entries(self) -> Option<DatedEntries> {
        match self {
            ProviderPayload::PriceVolume(e)
            | ProviderPayload::Rsi(e)
            | ProviderPayload::Macd(e)
            | ProviderPayload::Sma(e) => Some(e),
            ProviderPayload::Unrecognized(_) => None,
        }
    }
}

/// Normalize a raw response for one indicator kind.
pub fn normalize(
    kind: IndicatorKind,
    raw: &RawResponse,
) -> Result<IndicatorSeries, NormalizationError> {
    normalize_payload(kind, ProviderPayload::decode(raw)?)
}

/// Normalize an already decoded payload.
///
/// A payload of another kind counts as absent.
pub fn normalize_payload(
    kind: IndicatorKind,
    payload: ProviderPayload,
) -> Result<IndicatorSeries, NormalizationError> {
    if payload.kind() != Some(kind) {
        let detail = match (&payload, payload.notice()) {
            (_, Some(notice)) => notice.to_string(),
            (ProviderPayload::Unrecognized(None), None) => "no recognised payload".to_string(),
            (other, None) => format!(
                "response carries a {} payload instead",
                other.kind().map(|k| k.to_string()).unwrap_or_default()
            ),
        };
        if !kind.is_optional() {
            return Err(NormalizationError::MissingPayload { kind, detail });
        }
        warn!(indicator = %kind, %detail, "indicator payload absent, treating as empty");
        return Ok(IndicatorSeries::empty(kind));
    }

    let entries = payload.into_entries().unwrap_or_default();
    let mut points = Vec::with_capacity(entries.len());
    for (key, values) in &entries {
        let date = parse_date_key(key).ok_or_else(|| NormalizationError::InvalidDate {
            kind,
            key: key.clone(),
        })?;

        let mut point = TimeSeriesPoint::new(date);
        for &(field, source) in field_sources(kind) {
            let raw = values
                .get(source)
                .ok_or_else(|| NormalizationError::MissingField {
                    kind,
                    date: key.clone(),
                    field,
                })?;
            let value = metric_value(raw).ok_or_else(|| NormalizationError::InvalidNumber {
                kind,
                date: key.clone(),
                field,
                value: metric_text(raw),
            })?;
            point.fields.insert(field.to_string(), value);
        }
        points.push(point);
    }

    points.sort_by_key(|p| p.date);
    IndicatorSeries::from_points(kind, points)
        .map_err(|date| NormalizationError::DuplicateDate { kind, date })
}

/// (field name, provider key) pairs per kind, in schema order.
fn field_sources(kind: IndicatorKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        IndicatorKind::PriceVolume => &[
            ("open", "1. open"),
            ("high", "2. high"),
            ("low", "3. low"),
            ("close", "4. close"),
            ("volume", "5. volume"),
        ],
        IndicatorKind::Rsi => &[("RSI", "RSI")],
        IndicatorKind::Macd => &[
            ("MACD", "MACD"),
            ("MACD_Signal", "MACD_Signal"),
            ("MACD_Hist", "MACD_Hist"),
        ],
        IndicatorKind::Sma => &[("SMA", "SMA")],
    }
}

/// Daily keys are `YYYY-MM-DD`; indicator keys occasionally carry a time.
fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let key = key.trim();
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(key, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(key, "%Y-%m-%d %H:%M")
                .ok()
                .map(|dt| dt.date())
        })
}
