use std::{error::Error, sync::Arc};

use candle_history::{
    HistoryClient,
    cache::{DayCache, FsStore},
    cli::{
        Cli,
        params::{Retrieval, load_config},
    },
    errors::ConfigSnafu,
    progress::LogProgress,
    providers::alpaca_rest::AlpacaProvider,
};
use chrono::Utc;
use clap::Parser;
use snafu::ResultExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let settings = config.pipeline().context(ConfigSnafu)?;

    info!(cache_dir = %config.cache_dir.display(), "using cache");
    let provider = AlpacaProvider::new(config.alpaca.clone())?;
    let cache = DayCache::new(Arc::new(FsStore::new(&config.cache_dir)));
    let client = HistoryClient::new(Arc::new(provider), cache, settings)
        .with_progress(Arc::new(LogProgress::new()));

    let as_of = Utc::now();
    let mut candles = match Retrieval::from(cli.command) {
        Retrieval::Range(request) => client.fetch_range(&request, as_of).await?,
        Retrieval::Window(request) => client.fetch_window(&request, as_of).await?,
    };
    candles.sort_by_key(|c| c.timestamp);

    for candle in &candles {
        println!("{}", serde_json::to_string(candle)?);
    }
    info!(candles = candles.len(), "done");
    Ok(())
}
