//! Fetching, normalization and date alignment of provider series

pub mod align;
pub mod alpha_vantage;
pub mod normalize;
pub mod provider;
pub mod series;
pub mod table;

pub use align::{align_to_prices, OptionalSeries};
pub use alpha_vantage::AlphaVantageClient;
pub use normalize::{normalize, NormalizationError, ProviderNotice, ProviderPayload};
pub use provider::{FetchError, RawResponse, SeriesFetcher, SeriesRequest};
pub use series::{IndicatorKind, IndicatorSeries, TimeSeriesPoint};
pub use table::{AggregatedRow, AggregatedTable, Column, SkipReason, SkippedIndicator};
