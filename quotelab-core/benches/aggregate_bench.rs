//! Criterion benchmarks for QuoteLab hot paths.
//!
//! Benchmarks:
//! 1. Normalization of a full-history daily response
//! 2. Rolling volatility over the normalized price series
//! 3. Full aggregation (normalize + volatility + merge) against scripted responses

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quotelab_core::aggregate;
use quotelab_core::config::FeedConfig;
use quotelab_core::data::{normalize, IndicatorKind, RawResponse};
use quotelab_core::indicators::RollingVolatility;
use quotelab_core::testing::{
    daily_response, macd_response, single_metric_response, trading_days, ScriptedFetcher,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<(NaiveDate, f64)> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    trading_days(start, n)
        .into_iter()
        .enumerate()
        .map(|(i, d)| (d, 100.0 + (i as f64 * 0.1).sin() * 10.0))
        .collect()
}

fn make_fetcher(n: usize) -> ScriptedFetcher {
    let bars = make_bars(n);
    let rsi: Vec<_> = bars.iter().skip(14).map(|(d, c)| (*d, c % 100.0)).collect();
    let sma: Vec<_> = bars.iter().skip(19).map(|(d, c)| (*d, *c)).collect();
    let macd: Vec<_> = bars.iter().skip(33).map(|(d, c)| (*d, c * 0.01, c * 0.009)).collect();
    ScriptedFetcher::new()
        .respond("TIME_SERIES_DAILY", daily_response(&bars))
        .respond("RSI", single_metric_response("RSI", &rsi))
        .respond("MACD", macd_response(&macd))
        .respond("SMA", single_metric_response("SMA", &sma))
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_daily");
    for n in [100usize, 5000] {
        let raw = RawResponse::new(daily_response(&make_bars(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &raw, |b, raw| {
            b.iter(|| normalize(IndicatorKind::PriceVolume, black_box(raw)).unwrap())
        });
    }
    group.finish();
}

fn bench_volatility(c: &mut Criterion) {
    let raw = RawResponse::new(daily_response(&make_bars(5000)));
    let prices = normalize(IndicatorKind::PriceVolume, &raw).unwrap();
    let vol = RollingVolatility::default();
    c.bench_function("volatility_5000", |b| {
        b.iter(|| vol.compute(black_box(&prices)))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let config = FeedConfig::for_symbol("BENCH");
    for n in [100usize, 5000] {
        let fetcher = make_fetcher(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &fetcher, |b, fetcher| {
            b.iter(|| aggregate("BENCH", &config, black_box(fetcher)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_volatility, bench_aggregate);
criterion_main!(benches);
