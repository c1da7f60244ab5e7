use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::rates::{RateError, RateProvider, RateSet};

/// Fetches historical rates from a fastforex.io-style `/historical`
/// endpoint. One best-effort request per call; no retry, no timeout.
pub struct FastForexProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl FastForexProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        FastForexProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct HistoricalResponse {
    results: Option<RateSet>,
    error: Option<String>,
}

#[async_trait]
impl RateProvider for FastForexProvider {
    #[instrument(
        name = "HistoricalRateFetch",
        skip(self),
        fields(date = %date, base = %base)
    )]
    async fn fetch_rates(&self, date: NaiveDate, base: &str) -> Result<RateSet, RateError> {
        let url = format!("{}/historical", self.base_url);
        debug!("Requesting historical rates from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("date", date.format("%Y-%m-%d").to_string()),
                ("from", base.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await?;

        debug!(status = %response.status(), "Received rate service response");

        let body = response
            .json::<HistoricalResponse>()
            .await
            .map_err(|e| RateError::Malformed(e.to_string()))?;

        match body.results {
            Some(results) => Ok(results),
            None => {
                // The service reports unsupported currencies through an
                // `error` body instead of a `results` field.
                if let Some(message) = body.error {
                    debug!(%message, "Rate service rejected the request");
                }
                Err(RateError::UnknownCurrency {
                    base: base.to_string(),
                    date,
                })
            }
        }
    }
}
