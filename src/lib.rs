pub mod cache;
pub mod config;
pub mod journal;
pub mod log;
pub mod providers;
pub mod rates;
pub mod session;
pub mod validate;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

pub async fn run(date: NaiveDate, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let store = cache::RateStore::open(data_dir.join("cache.json"))?;
    let fetcher = providers::fastforex::FastForexProvider::new(config.base_url(), &config.api_key);
    let provider = cache::CachingRateProvider::new(fetcher, store);
    let journal = journal::ConversionJournal::new(data_dir.join("conversions.json"));

    let session = session::ConversionSession::new(date, &provider, &journal);
    let stdin = std::io::stdin();
    session.run(stdin.lock(), &mut std::io::stdout()).await
}
