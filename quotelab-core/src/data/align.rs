//! Date alignment of indicator series onto the price series.
//!
//! The price series fixes the row set and order. Every other series is looked
//! up by exact date; dates it lacks stay null. Nothing is forward-filled or
//! interpolated.

use super::series::{IndicatorKind, IndicatorSeries, TimeSeriesPoint};
use super::table::{AggregatedRow, AggregatedTable, Column};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Optional indicator series to attach, each possibly empty.
#[derive(Debug, Clone, Copy)]
pub struct OptionalSeries<'a> {
    pub rsi: &'a IndicatorSeries,
    pub macd: &'a IndicatorSeries,
    pub sma: &'a IndicatorSeries,
    /// Period the SMA was requested with; names the `sma_<period>` column.
    pub sma_period: u32,
}

/// Merge price rows, the volatility column and optional indicators.
///
/// `volatility` has one entry per price point. Optional groups whose series
/// is empty add no columns.
pub fn align_to_prices(
    symbol: &str,
    prices: &IndicatorSeries,
    volatility: &[Option<f64>],
    optional: OptionalSeries<'_>,
) -> AggregatedTable {
    debug_assert_eq!(prices.kind(), IndicatorKind::PriceVolume);

    let mut columns = Column::MANDATORY.to_vec();
    if !optional.rsi.is_empty() {
        columns.push(Column::Rsi);
    }
    if !optional.macd.is_empty() {
        columns.push(Column::Macd);
        columns.push(Column::MacdSignal);
    }
    if !optional.sma.is_empty() {
        columns.push(Column::Sma {
            period: optional.sma_period,
        });
    }

    let rsi = date_lookup(optional.rsi);
    let macd = date_lookup(optional.macd);
    let sma = date_lookup(optional.sma);
    let field = |lookup: &HashMap<NaiveDate, &TimeSeriesPoint>, date: &NaiveDate, name: &str| {
        lookup.get(date).and_then(|p| p.get(name))
    };

    let rows = prices
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let date = point.date;
            AggregatedRow {
                date,
                open: point.get("open").unwrap_or(f64::NAN),
                high: point.get("high").unwrap_or(f64::NAN),
                low: point.get("low").unwrap_or(f64::NAN),
                close: point.get("close").unwrap_or(f64::NAN),
                volume: point.get("volume").unwrap_or(f64::NAN),
                volatility: volatility.get(i).copied().flatten(),
                rsi: field(&rsi, &date, "RSI"),
                macd: field(&macd, &date, "MACD"),
                macd_signal: field(&macd, &date, "MACD_Signal"),
                sma: field(&sma, &date, "SMA"),
            }
        })
        .collect();

    AggregatedTable {
        symbol: symbol.to_string(),
        columns,
        rows,
        skipped: Vec::new(),
    }
}

fn date_lookup(series: &IndicatorSeries) -> HashMap<NaiveDate, &TimeSeriesPoint> {
    series.points().iter().map(|p| (p.date, p)).collect()
}
