//! Date-indexed series: the normalized form of every provider response.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The four series the provider is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorKind {
    PriceVolume,
    Rsi,
    Macd,
    Sma,
}

impl IndicatorKind {
    /// Indicators that are fetched best-effort after the price series.
    pub const OPTIONAL: [IndicatorKind; 3] =
        [IndicatorKind::Rsi, IndicatorKind::Macd, IndicatorKind::Sma];

    /// Value of the `function` query parameter.
    pub fn function(&self) -> &'static str {
        match self {
            IndicatorKind::PriceVolume => "TIME_SERIES_DAILY",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Sma => "SMA",
        }
    }

    /// Top-level key under which the provider nests the dated entries.
    pub fn payload_key(&self) -> &'static str {
        match self {
            IndicatorKind::PriceVolume => "Time Series (Daily)",
            IndicatorKind::Rsi => "Technical Analysis: RSI",
            IndicatorKind::Macd => "Technical Analysis: MACD",
            IndicatorKind::Sma => "Technical Analysis: SMA",
        }
    }

    /// Field names every point of this kind carries, in column order.
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            IndicatorKind::PriceVolume => &["open", "high", "low", "close", "volume"],
            IndicatorKind::Rsi => &["RSI"],
            IndicatorKind::Macd => &["MACD", "MACD_Signal", "MACD_Hist"],
            IndicatorKind::Sma => &["SMA"],
        }
    }

    pub fn is_optional(&self) -> bool {
        !matches!(self, IndicatorKind::PriceVolume)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorKind::PriceVolume => "price/volume",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Sma => "SMA",
        };
        f.write_str(name)
    }
}

/// One trading date and its named numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub fields: BTreeMap<String, f64>,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// Ordered points of one indicator kind.
///
/// Dates are unique and strictly ascending. The only constructors are the
/// normalizer (which sorts and rejects duplicates) and [`IndicatorSeries::from_points`],
/// which checks the ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    kind: IndicatorKind,
    points: Vec<TimeSeriesPoint>,
}

impl IndicatorSeries {
    pub fn empty(kind: IndicatorKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
        }
    }

    /// Build a series from points that are already strictly ascending by date.
    ///
    /// Returns the first out-of-order date on failure.
    pub fn from_points(
        kind: IndicatorKind,
        points: Vec<TimeSeriesPoint>,
    ) -> Result<Self, NaiveDate> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(pair[1].date);
        }
        Ok(Self { kind, points })
    }

    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Values of one field across the series, `None` where a point lacks it.
    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.get(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn from_points_accepts_ascending_dates() {
        let points = vec![
            TimeSeriesPoint::new(day(2)).with_field("RSI", 40.0),
            TimeSeriesPoint::new(day(3)).with_field("RSI", 41.0),
        ];
        let series = IndicatorSeries::from_points(IndicatorKind::Rsi, points).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.column("RSI"), vec![Some(40.0), Some(41.0)]);
    }

    #[test]
    fn from_points_rejects_duplicates_and_reordering() {
        let dup = vec![TimeSeriesPoint::new(day(2)), TimeSeriesPoint::new(day(2))];
        assert_eq!(
            IndicatorSeries::from_points(IndicatorKind::Sma, dup).unwrap_err(),
            day(2)
        );

        let reversed = vec![TimeSeriesPoint::new(day(5)), TimeSeriesPoint::new(day(4))];
        assert_eq!(
            IndicatorSeries::from_points(IndicatorKind::Sma, reversed).unwrap_err(),
            day(4)
        );
    }

    #[test]
    fn kind_metadata_matches_provider_protocol() {
        assert_eq!(IndicatorKind::PriceVolume.function(), "TIME_SERIES_DAILY");
        assert_eq!(IndicatorKind::Macd.payload_key(), "Technical Analysis: MACD");
        assert_eq!(
            IndicatorKind::PriceVolume.schema(),
            &["open", "high", "low", "close", "volume"]
        );
        assert!(!IndicatorKind::PriceVolume.is_optional());
        assert!(IndicatorKind::OPTIONAL.iter().all(|k| k.is_optional()));
    }
}
