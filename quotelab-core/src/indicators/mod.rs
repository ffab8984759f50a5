//! Indicators computed locally from the normalized price series.
//!
//! RSI, MACD and SMA come from the provider; only volatility is derived here.

pub mod volatility;

pub use volatility::{compute_volatility, RollingVolatility};

/// Build a price series from close prices for testing.
///
/// Dates start at 2024-01-02 and advance one calendar day per point.
/// open = prev_close (or close for the first point), high/low = max/min(open, close) ± 1.0,
/// volume = 1000.
#[cfg(test)]
pub fn make_price_series(closes: &[f64]) -> crate::data::IndicatorSeries {
    use crate::data::{IndicatorKind, IndicatorSeries, TimeSeriesPoint};
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            TimeSeriesPoint::new(base_date + chrono::Duration::days(i as i64))
                .with_field("open", open)
                .with_field("high", open.max(close) + 1.0)
                .with_field("low", open.min(close) - 1.0)
                .with_field("close", close)
                .with_field("volume", 1000.0)
        })
        .collect();
    IndicatorSeries::from_points(IndicatorKind::PriceVolume, points).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
