use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::constants::market_data::{
    HISTORY_INTERVAL, HISTORY_RANGE, NOT_FOUND_CODE, USER_AGENT,
};
use crate::data::types::{PriceHistory, PricePoint};
use crate::error::MarketDataError;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Trailing 7-day daily closes for `ticker`, oldest first.
    ///
    /// An unknown symbol is `Ok` with an empty history, not an error.
    async fn fetch_history(&self, ticker: &str) -> Result<PriceHistory, MarketDataError>;
}

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartNode>,
}

#[derive(Deserialize)]
struct ChartNode {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartErrorNode>,
}

#[derive(Deserialize)]
struct ChartErrorNode {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance v8 chart API client
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: Url,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn chart_url(&self, ticker: &str) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        url.query_pairs_mut()
            .append_pair("range", HISTORY_RANGE)
            .append_pair("interval", HISTORY_INTERVAL);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_history(&self, ticker: &str) -> Result<PriceHistory, MarketDataError> {
        let url = self.chart_url(ticker)?;
        info!("📡 [MARKET] Fetching {} history for {}", HISTORY_RANGE, ticker);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| MarketDataError::Network {
                ticker: ticker.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            info!("📡 [MARKET] {} not found upstream", ticker);
            return Ok(Vec::new());
        }
        if !status.is_success() {
            warn!("⚠️ [MARKET] {} returned HTTP {}", ticker, status);
            return Err(MarketDataError::Status {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|source| MarketDataError::Network {
            ticker: ticker.to_string(),
            source,
        })?;

        decode_chart(ticker, &body)
    }
}

/// Decode a chart API body into closes, dropping null entries.
pub(crate) fn decode_chart(ticker: &str, body: &str) -> Result<PriceHistory, MarketDataError> {
    let parse_err = |reason: String| MarketDataError::Parse {
        ticker: ticker.to_string(),
        reason,
    };

    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| parse_err(format!("json parse error: {e}")))?;
    let chart = envelope
        .chart
        .ok_or_else(|| parse_err("missing chart".into()))?;

    if let Some(err) = chart.error {
        if err.code == NOT_FOUND_CODE {
            return Ok(Vec::new());
        }
        return Err(MarketDataError::Upstream {
            ticker: ticker.to_string(),
            code: err.code,
            description: err.description,
        });
    }

    let Some(result) = chart.result.and_then(|mut r| r.pop()) else {
        return Ok(Vec::new());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut history: PriceHistory = timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            Some(PricePoint { timestamp, close })
        })
        .collect();

    history.sort_by_key(|p| p.timestamp);
    Ok(history)
}
