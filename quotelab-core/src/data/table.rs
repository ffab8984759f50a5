//! The aggregated output table.

use super::normalize::{NormalizationError, ProviderNotice};
use super::provider::FetchError;
use super::series::IndicatorKind;
use chrono::NaiveDate;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// One output column.
///
/// The SMA column is named after its period (`sma_20` under the default
/// config), so the CSV header changes whenever `sma_period` is not 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    Volatility,
    Rsi,
    Macd,
    MacdSignal,
    Sma { period: u32 },
}

impl Column {
    /// Columns every table has, in order.
    pub const MANDATORY: [Column; 6] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
        Column::Volatility,
    ];

    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Column::Open => "open".into(),
            Column::High => "high".into(),
            Column::Low => "low".into(),
            Column::Close => "close".into(),
            Column::Volume => "volume".into(),
            Column::Volatility => "volatility".into(),
            Column::Rsi => "rsi".into(),
            Column::Macd => "macd".into(),
            Column::MacdSignal => "macd_signal".into(),
            Column::Sma { period } => format!("sma_{period}").into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One trading date of the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub volatility: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma: Option<f64>,
}

impl AggregatedRow {
    pub fn get(&self, column: Column) -> Option<f64> {
        match column {
            Column::Open => Some(self.open),
            Column::High => Some(self.high),
            Column::Low => Some(self.low),
            Column::Close => Some(self.close),
            Column::Volume => Some(self.volume),
            Column::Volatility => self.volatility,
            Column::Rsi => self.rsi,
            Column::Macd => self.macd,
            Column::MacdSignal => self.macd_signal,
            Column::Sma { .. } => self.sma,
        }
    }
}

/// Why an optional indicator contributed no columns.
#[derive(Debug, Clone)]
pub enum SkipReason {
    Fetch(FetchError),
    Normalization(NormalizationError),
    /// The response had no payload or an empty one.
    NoData { notice: Option<ProviderNotice> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "fetch failed: {e}"),
            SkipReason::Normalization(e) => write!(f, "normalization failed: {e}"),
            SkipReason::NoData { notice: Some(n) } => write!(f, "no data ({n})"),
            SkipReason::NoData { notice: None } => f.write_str("no data"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedIndicator {
    pub kind: IndicatorKind,
    pub reason: SkipReason,
}

/// Price/volume rows for one symbol with indicator columns attached.
///
/// Rows are exactly the price series dates, ascending. `columns` lists the
/// mandatory columns followed by each optional group whose source had data.
#[derive(Debug, Clone)]
pub struct AggregatedTable {
    pub symbol: String,
    pub columns: Vec<Column>,
    pub rows: Vec<AggregatedRow>,
    pub skipped: Vec<SkippedIndicator>,
}

impl AggregatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().into_owned()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Values of a named column, or `None` if the table has no such column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let column = *self.columns.iter().find(|c| c.name() == name)?;
        Some(self.rows.iter().map(|r| r.get(column)).collect())
    }
}
