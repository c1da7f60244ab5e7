//! Historical exchange-rate lookup abstractions.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// Mapping of target currency codes to exchange rates for one
/// (date, base currency) pair.
pub type RateSet = HashMap<String, f64>;

/// Failures on the rate-lookup path. The conversion loop re-prompts on
/// `UnknownCurrency` and treats everything else as fatal.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("no rates available for {base} on {date}")]
    UnknownCurrency { base: String, date: NaiveDate },

    #[error("rate service request failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from rate service: {0}")]
    Malformed(String),

    #[error("failed to persist rate cache: {0}")]
    Store(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Returns the full rate set for `base` on `date`.
    async fn fetch_rates(&self, date: NaiveDate, base: &str) -> Result<RateSet, RateError>;
}
