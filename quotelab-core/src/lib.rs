//! QuoteLab Core: daily price history plus technical indicators for one symbol.
//!
//! This crate contains the indicator-aggregation engine:
//! - Series fetcher trait and the Alpha Vantage HTTP client
//! - Normalizer from raw provider bodies to date-indexed series
//! - Locally computed rolling volatility
//! - Aggregator that merges everything onto the price dates
//! - CSV export and a console run summary

pub mod aggregate;
pub mod config;
pub mod data;
pub mod export;
pub mod indicators;
pub mod summary;
pub mod testing;

pub use aggregate::{aggregate, run_feed, AggregationError};
pub use config::{ApiKey, ConfigError, FeedConfig};
pub use data::{AggregatedTable, AlphaVantageClient, IndicatorKind, IndicatorSeries};
pub use export::{default_output_path, export_csv, write_csv_file, ExportError};
pub use summary::TableSummary;
