//! Indicator aggregation: drives the fetcher and normalizer for every series
//! and merges the results into one table.
//!
//! The price series is mandatory: any failure on it aborts the run. RSI, MACD
//! and SMA are best-effort: a failure degrades that indicator to "no columns"
//! and is recorded in [`AggregatedTable::skipped`]. Fetches run one after
//! another because the provider's rate limit is shared per key.

use crate::config::{ApiKey, ConfigError, FeedConfig};
use crate::data::normalize::normalize_payload;
use crate::data::{
    align_to_prices, normalize, AggregatedTable, AlphaVantageClient, FetchError, IndicatorKind,
    IndicatorSeries, NormalizationError, OptionalSeries, ProviderPayload, SeriesFetcher,
    SeriesRequest, SkipReason, SkippedIndicator,
};
use crate::indicators::RollingVolatility;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal aggregation failures.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to set up the provider client")]
    Client(#[source] FetchError),

    #[error("failed to fetch price series for {symbol}")]
    PriceFetch {
        symbol: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to normalize price series for {symbol}")]
    PriceNormalization {
        symbol: String,
        #[source]
        source: NormalizationError,
    },
}

/// Run a feed against the live provider.
///
/// The API key is resolved through `lookup` first; without one no client is
/// built and nothing is sent.
pub fn run_feed<L>(config: &FeedConfig, lookup: L) -> Result<AggregatedTable, AggregationError>
where
    L: FnOnce(&str) -> Option<String>,
{
    let api_key = ApiKey::from_lookup(lookup)?;
    let client =
        AlphaVantageClient::new(api_key, &config.provider).map_err(AggregationError::Client)?;
    aggregate(&config.symbol, config, &client)
}

/// Fetch, normalize and merge all series for `symbol`.
pub fn aggregate(
    symbol: &str,
    config: &FeedConfig,
    fetcher: &dyn SeriesFetcher,
) -> Result<AggregatedTable, AggregationError> {
    config.validate()?;
    if symbol.trim().is_empty() {
        return Err(ConfigError::EmptySymbol.into());
    }
    let params = &config.indicators;

    info!(symbol, provider = fetcher.name(), "fetching price/volume series");
    let request = SeriesRequest::for_kind(
        IndicatorKind::PriceVolume,
        symbol,
        params,
        config.provider.output_size,
    );
    let raw = fetcher
        .fetch(&request)
        .map_err(|source| AggregationError::PriceFetch {
            symbol: symbol.to_string(),
            source,
        })?;
    let prices = normalize(IndicatorKind::PriceVolume, &raw).map_err(|source| {
        AggregationError::PriceNormalization {
            symbol: symbol.to_string(),
            source,
        }
    })?;
    info!(symbol, rows = prices.len(), "price series normalized");

    let calculator = RollingVolatility::new(params.volatility_window);
    debug!(symbol, window = calculator.window(), "computing rolling volatility");
    let volatility = calculator.compute(&prices);

    let mut skipped = Vec::new();
    let rsi = fetch_optional(fetcher, IndicatorKind::Rsi, symbol, config, &mut skipped);
    let macd = fetch_optional(fetcher, IndicatorKind::Macd, symbol, config, &mut skipped);
    let sma = fetch_optional(fetcher, IndicatorKind::Sma, symbol, config, &mut skipped);

    let mut table = align_to_prices(
        symbol,
        &prices,
        &volatility,
        OptionalSeries {
            rsi: &rsi,
            macd: &macd,
            sma: &sma,
            sma_period: params.sma_period,
        },
    );
    table.skipped = skipped;

    info!(
        symbol,
        rows = table.len(),
        columns = table.columns.len(),
        skipped = table.skipped.len(),
        "aggregation complete"
    );
    Ok(table)
}

/// Fetch and normalize one optional indicator. Never fails: problems are
/// logged, recorded in `skipped`, and yield an empty series.
fn fetch_optional(
    fetcher: &dyn SeriesFetcher,
    kind: IndicatorKind,
    symbol: &str,
    config: &FeedConfig,
    skipped: &mut Vec<SkippedIndicator>,
) -> IndicatorSeries {
    let request = SeriesRequest::for_kind(
        kind,
        symbol,
        &config.indicators,
        config.provider.output_size,
    );
    info!(symbol, indicator = %kind, "fetching indicator");

    let outcome = fetcher
        .fetch(&request)
        .map_err(SkipReason::Fetch)
        .and_then(|raw| {
            let payload = ProviderPayload::decode(&raw).map_err(SkipReason::Normalization)?;
            let notice = payload.notice().cloned();
            let series = normalize_payload(kind, payload).map_err(SkipReason::Normalization)?;
            if series.is_empty() {
                return Err(SkipReason::NoData { notice });
            }
            Ok(series)
        });

    match outcome {
        Ok(series) => {
            info!(symbol, indicator = %kind, points = series.len(), "indicator normalized");
            series
        }
        Err(reason) => {
            warn!(symbol, indicator = %kind, %reason, "indicator unavailable, omitting its columns");
            skipped.push(SkippedIndicator { kind, reason });
            IndicatorSeries::empty(kind)
        }
    }
}
