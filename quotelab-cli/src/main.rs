//! QuoteLab CLI: fetch one symbol's daily history with indicators into CSV.
//!
//! Commands:
//! - `fetch`: query price/volume, RSI, MACD and SMA, add volatility, write CSV
//! - `check`: validate the config file and the API key without any network access

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotelab_core::config::API_KEY_ENV;
use quotelab_core::{
    default_output_path, run_feed, write_csv_file, ApiKey, FeedConfig, TableSummary,
};

#[derive(Parser)]
#[command(
    name = "quotelab",
    about = "QuoteLab CLI: daily prices and technical indicators for one symbol"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and aggregate price history and indicators, then write a CSV file.
    Fetch {
        /// Path to the TOML config file.
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,

        /// Override the symbol from the config file.
        #[arg(long)]
        symbol: Option<String>,

        /// Output CSV path. Defaults to <SYMBOL>_stock_data.csv.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate the config file and check that the API key is set.
    Check {
        /// Path to the TOML config file.
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            config,
            symbol,
            output,
        } => run_fetch(&config, symbol, output),
        Commands::Check { config } => run_check(&config),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path, symbol: Option<String>) -> Result<FeedConfig> {
    let mut config = FeedConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    if let Some(symbol) = symbol {
        config.symbol = symbol;
        config.validate().context("invalid --symbol override")?;
    }
    Ok(config)
}

fn run_fetch(config_path: &Path, symbol: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, symbol)?;
    println!("Fetching data for {}...", config.symbol);
    let table = run_feed(&config, |var| std::env::var(var).ok())?;

    println!("\nData fetched successfully!");
    print!("{}", TableSummary::from_table(&table));

    let path = output.unwrap_or_else(|| default_output_path(&config.symbol));
    write_csv_file(&table, &path)?;
    info!(path = %path.display(), rows = table.len(), "table written");
    println!("\nData saved to {}", path.display());
    Ok(())
}

fn run_check(config_path: &Path) -> Result<()> {
    let config = load_config(config_path, None)?;
    println!("Config OK: symbol {}", config.symbol);
    println!(
        "  RSI period {} ({}), MACD on {}, SMA period {} ({}), volatility window {}",
        config.indicators.rsi_period,
        config.indicators.rsi_series_type.as_str(),
        config.indicators.macd_series_type.as_str(),
        config.indicators.sma_period,
        config.indicators.sma_series_type.as_str(),
        config.indicators.volatility_window,
    );
    println!(
        "  Provider {} (timeout {}s, output size {})",
        config.provider.base_url,
        config.provider.timeout_secs,
        config.provider.output_size.as_str(),
    );

    ApiKey::from_env()?;
    println!("API key: set ({API_KEY_ENV})");
    Ok(())
}
