//! Rolling volatility of daily close-to-close returns.
//!
//! r_i = (close_i - close_{i-1}) / close_{i-1}, undefined for the first row and
//! wherever the previous close is zero. volatility_i is the sample standard
//! deviation (n - 1 divisor) of the trailing `window` returns ending at i, and
//! is only defined when every return in that window is defined.
//! With the default window of 20 the first value lands at index 20.

use crate::data::IndicatorSeries;

/// Default trailing window, in returns.
pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone)]
pub struct RollingVolatility {
    window: usize,
}

impl RollingVolatility {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "volatility window must be >= 2");
        Self { window }
    }

    /// Trailing window length; also the index of the first row that can hold a value.
    pub fn window(&self) -> usize {
        self.window
    }

    /// One value per point of a price series.
    pub fn compute(&self, prices: &IndicatorSeries) -> Vec<Option<f64>> {
        self.compute_closes(&prices.column("close"))
    }

    pub fn compute_closes(&self, closes: &[Option<f64>]) -> Vec<Option<f64>> {
        let returns = pct_change(closes);
        let n = returns.len();
        let mut result = vec![None; n];

        let mut window_buf = Vec::with_capacity(self.window);
        for i in (self.window - 1)..n {
            window_buf.clear();
            window_buf.extend(returns[(i + 1 - self.window)..=i].iter().flatten());
            if window_buf.len() == self.window {
                result[i] = sample_std(&window_buf);
            }
        }

        result
    }
}

impl Default for RollingVolatility {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Volatility with the default 20-return window.
pub fn compute_volatility(prices: &IndicatorSeries) -> Vec<Option<f64>> {
    RollingVolatility::default().compute(prices)
}

/// Fractional change from the previous close.
pub fn pct_change(closes: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let r = match (i.checked_sub(1).and_then(|p| closes[p]), closes[i]) {
            (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev),
            _ => None,
        };
        out.push(r);
    }
    out
}

/// Sample standard deviation with the n - 1 divisor. `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((ss / (n - 1) as f64).sqrt())
}
