use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::data::types::CurrencyPair;
use crate::error::RateError;

#[async_trait]
pub trait RateProvider: Send + Sync {
    fn pair(&self) -> &CurrencyPair;

    /// Units of `pair().target` per unit of `pair().base`.
    ///
    /// `None` means unavailable; a returned rate is always positive and finite.
    async fn latest_rate(&self) -> Option<f64>;
}

#[derive(Deserialize, Debug)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// exchangerate-api.com v4 client (`/v4/latest/{BASE}`)
#[derive(Clone)]
pub struct HttpRateProvider {
    client: Client,
    base_url: String,
    pair: CurrencyPair,
}

impl HttpRateProvider {
    pub fn new(base_url: &str, pair: CurrencyPair, timeout: Duration) -> Result<Self, RateError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            pair,
        })
    }

    /// Single bounded request; every failure mode is a typed error.
    pub async fn fetch_rate(&self) -> Result<f64, RateError> {
        let url = format!("{}/v4/latest/{}", self.base_url, self.pair.base);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::Status {
                status: status.as_u16(),
            });
        }

        let data: RatesResponse = resp.json().await?;
        select_rate(&data.rates, &self.pair)
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    async fn latest_rate(&self) -> Option<f64> {
        match self.fetch_rate().await {
            Ok(rate) => {
                info!(
                    "💱 [FX] {}->{} rate: {}",
                    self.pair.base, self.pair.target, rate
                );
                Some(rate)
            }
            Err(e) => {
                warn!(
                    "⚠️ [FX] Error fetching exchange rate {}->{}: {}",
                    self.pair.base, self.pair.target, e
                );
                None
            }
        }
    }
}

/// A missing, zero, negative or non-finite rate is the same absence.
pub(crate) fn select_rate(
    rates: &HashMap<String, f64>,
    pair: &CurrencyPair,
) -> Result<f64, RateError> {
    let rate = rates
        .get(&pair.target)
        .copied()
        .ok_or_else(|| RateError::MissingRate {
            base: pair.base.clone(),
            target: pair.target.clone(),
        })?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(RateError::InvalidRate {
            base: pair.base.clone(),
            target: pair.target.clone(),
            rate,
        });
    }
    Ok(rate)
}
