//! Feed configuration and credential handling.
//!
//! The config file is TOML. Only `symbol` is required; every other section
//! falls back to the parameters the provider's free tier is normally queried with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable the API key is read from.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Price field an indicator is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    #[default]
    Close,
    Open,
    High,
    Low,
}

impl SeriesType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesType::Close => "close",
            SeriesType::Open => "open",
            SeriesType::High => "high",
            SeriesType::Low => "low",
        }
    }
}

/// How much daily history the price request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 trading days.
    #[default]
    Compact,
    /// Full available history.
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Indicator request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: u32,
    pub rsi_series_type: SeriesType,
    pub macd_series_type: SeriesType,
    /// MACD period overrides; the provider's defaults (12/26/9) apply when unset.
    pub macd_fast_period: Option<u32>,
    pub macd_slow_period: Option<u32>,
    pub macd_signal_period: Option<u32>,
    pub sma_period: u32,
    pub sma_series_type: SeriesType,
    /// Trailing window (in daily returns) for the local volatility column.
    pub volatility_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_series_type: SeriesType::Close,
            macd_series_type: SeriesType::Close,
            macd_fast_period: None,
            macd_slow_period: None,
            macd_signal_period: None,
            sma_period: 20,
            sma_series_type: SeriesType::Close,
            volatility_window: 20,
        }
    }
}

/// Transport settings for the HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Per-request timeout. There is no timeout on the run as a whole.
    pub timeout_secs: u64,
    pub output_size: OutputSize,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            output_size: OutputSize::Compact,
        }
    }
}

/// Full feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub symbol: String,
    #[serde(default)]
    pub indicators: IndicatorParams,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl FeedConfig {
    /// Config with default parameters for a symbol.
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            indicators: IndicatorParams::default(),
            provider: ProviderConfig::default(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        let p = &self.indicators;
        for (name, value) in [("rsi_period", p.rsi_period), ("sma_period", p.sma_period)] {
            if value == 0 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: "must be at least 1".into(),
                });
            }
        }
        for (name, value) in [
            ("macd_fast_period", p.macd_fast_period),
            ("macd_slow_period", p.macd_slow_period),
            ("macd_signal_period", p.macd_signal_period),
        ] {
            if value == Some(0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: "must be at least 1".into(),
                });
            }
        }
        if p.volatility_window < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "volatility_window",
                reason: format!(
                    "sample standard deviation needs at least 2 returns, got {}",
                    p.volatility_window
                ),
            });
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Provider API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            });
        }
        Ok(Self(key.trim().to_string()))
    }

    /// Read the key from [`API_KEY_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve the key through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(API_KEY_ENV) {
            Some(value) => Self::new(value),
            None => Err(ConfigError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            }),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
