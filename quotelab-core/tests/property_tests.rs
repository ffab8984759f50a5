//! Property tests for normalization and aggregation invariants.
//!
//! Uses proptest to verify:
//! 1. Ordering: normalized series are strictly ascending with unique dates
//! 2. Idempotence: normalizing the same response twice is bit-identical
//! 3. Row preservation: the merged table has exactly the price rows
//! 4. Volatility nulls: null iff the trailing window has an undefined return

use chrono::NaiveDate;
use proptest::prelude::*;
use quotelab_core::config::FeedConfig;
use quotelab_core::data::{normalize, IndicatorKind, RawResponse};
use quotelab_core::indicators::volatility::{pct_change, sample_std, RollingVolatility};
use quotelab_core::aggregate;
use quotelab_core::testing::{daily_response, single_metric_response, ScriptedFetcher};
use std::collections::BTreeSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_dates(max: usize) -> impl Strategy<Value = Vec<NaiveDate>> {
    prop::collection::btree_set(0u32..400, 0..max).prop_map(|offsets: BTreeSet<u32>| {
        let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        offsets
            .into_iter()
            .map(|o| base + chrono::Duration::days(o as i64))
            .collect()
    })
}

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_bars(max: usize) -> impl Strategy<Value = Vec<(NaiveDate, f64)>> {
    arb_dates(max).prop_flat_map(|dates| {
        let n = dates.len();
        prop::collection::vec(arb_price(), n)
            .prop_map(move |prices| dates.clone().into_iter().zip(prices).collect::<Vec<_>>())
    })
}

// ── 1 & 2. Normalization ─────────────────────────────────────────────

proptest! {
    #[test]
    fn normalized_dates_are_strictly_ascending(bars in arb_bars(60)) {
        let raw = RawResponse::new(daily_response(&bars));
        let series = normalize(IndicatorKind::PriceVolume, &raw).unwrap();
        prop_assert_eq!(series.len(), bars.len());
        let dates: Vec<_> = series.dates().collect();
        for w in dates.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn normalization_is_idempotent(bars in arb_bars(40)) {
        let raw = RawResponse::new(daily_response(&bars));
        let a = normalize(IndicatorKind::PriceVolume, &raw).unwrap();
        let b = normalize(IndicatorKind::PriceVolume, &raw).unwrap();
        prop_assert_eq!(a.len(), b.len());
        for (pa, pb) in a.points().iter().zip(b.points()) {
            prop_assert_eq!(pa.date, pb.date);
            for (name, va) in &pa.fields {
                prop_assert_eq!(va.to_bits(), pb.fields[name].to_bits());
            }
        }
    }
}

// ── 3. Row preservation ──────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_never_adds_or_drops_price_rows(
        bars in arb_bars(50),
        rsi_dates in arb_dates(50),
    ) {
        let rsi: Vec<_> = rsi_dates.iter().map(|d| (*d, 50.0)).collect();
        let fetcher = ScriptedFetcher::new()
            .respond("TIME_SERIES_DAILY", daily_response(&bars))
            .respond("RSI", single_metric_response("RSI", &rsi));
        let table = aggregate("TEST", &FeedConfig::for_symbol("TEST"), &fetcher).unwrap();

        prop_assert_eq!(table.len(), bars.len());
        let table_dates: Vec<_> = table.rows.iter().map(|r| r.date).collect();
        let price_dates: Vec<_> = bars.iter().map(|(d, _)| *d).collect();
        prop_assert_eq!(table_dates, price_dates);

        prop_assert_eq!(table.has_column("rsi"), !rsi.is_empty());
        let rsi_set: BTreeSet<_> = rsi_dates.into_iter().collect();
        for row in &table.rows {
            prop_assert_eq!(row.rsi.is_some(), rsi_set.contains(&row.date));
        }
    }
}

// ── 4. Volatility ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn volatility_null_iff_window_incomplete(
        closes in prop::collection::vec(prop_oneof![9 => arb_price(), 1 => Just(0.0)], 0..80),
        window in 2usize..25,
    ) {
        let closes: Vec<Option<f64>> = closes.into_iter().map(Some).collect();
        let vol = RollingVolatility::new(window).compute_closes(&closes);
        let returns = pct_change(&closes);
        prop_assert_eq!(vol.len(), closes.len());

        for i in 0..vol.len() {
            let complete = i + 1 >= window
                && returns[(i + 1 - window)..=i].iter().all(Option::is_some);
            prop_assert_eq!(vol[i].is_some(), complete, "index {}", i);
            if complete {
                let win: Vec<f64> = returns[(i + 1 - window)..=i].iter().flatten().copied().collect();
                let expected = sample_std(&win).unwrap();
                prop_assert!((vol[i].unwrap() - expected).abs() < 1e-12);
            }
        }
    }
}
