use std::sync::Arc;
use tracing::{info, warn};

use crate::constants::messages::{MISSING_TICKER, UNAVAILABLE};
use crate::data::fx::RateProvider;
use crate::data::types::{CurrencyPair, PricePoint};
use crate::data::yahoo::MarketDataProvider;
use crate::error::ChartError;
use crate::services::chart::{ChartArtifact, ChartRenderer};

/// Result of a quote request, tagged so adapters never inspect field presence.
#[derive(Clone, Debug, PartialEq)]
pub enum QuoteOutcome {
    /// Rate available and chart rendered
    Success {
        message: String,
        chart: ChartArtifact,
    },
    /// History found, but the rate was unavailable or the chart failed
    Degraded {
        message: String,
        chart: Option<ChartArtifact>,
    },
    /// Empty history or market-data failure
    NotFound { message: String },
    /// Blank ticker; no provider was called
    MissingTicker { message: String },
}

impl QuoteOutcome {
    pub fn message(&self) -> &str {
        match self {
            QuoteOutcome::Success { message, .. }
            | QuoteOutcome::Degraded { message, .. }
            | QuoteOutcome::NotFound { message }
            | QuoteOutcome::MissingTicker { message } => message,
        }
    }

    pub fn chart(&self) -> Option<&ChartArtifact> {
        match self {
            QuoteOutcome::Success { chart, .. } => Some(chart),
            QuoteOutcome::Degraded { chart, .. } => chart.as_ref(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QuoteOutcome::Success { .. })
    }
}

/// Trim and upper-case; `None` when nothing is left.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        None
    } else {
        Some(ticker)
    }
}

pub fn not_found_message(ticker: &str) -> String {
    format!("No data found for {}. Please check the ticker symbol.", ticker)
}

/// `Stock price for AAPL: $150.00 (~₹12450.00).`
pub fn format_quote_message(
    ticker: &str,
    latest_close: f64,
    rate: Option<f64>,
    pair: &CurrencyPair,
) -> String {
    let converted = match rate {
        Some(rate) => format!("{:.2}", latest_close * rate),
        None => UNAVAILABLE.to_string(),
    };
    format!(
        "Stock price for {}: {}{:.2} (~{}{}).",
        ticker,
        pair.base_symbol(),
        latest_close,
        pair.target_symbol(),
        converted
    )
}

/// Fetch history → rate → message → chart, shared by every entry point.
#[derive(Clone)]
pub struct QuoteService {
    market_data: Arc<dyn MarketDataProvider>,
    rates: Arc<dyn RateProvider>,
    renderer: Arc<dyn ChartRenderer>,
}

impl QuoteService {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        rates: Arc<dyn RateProvider>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            market_data,
            rates,
            renderer,
        }
    }

    pub fn pair(&self) -> &CurrencyPair {
        self.rates.pair()
    }

    pub async fn render_quote(&self, raw_ticker: &str) -> QuoteOutcome {
        let Some(ticker) = normalize_ticker(raw_ticker) else {
            return QuoteOutcome::MissingTicker {
                message: MISSING_TICKER.to_string(),
            };
        };

        info!("📈 [QUOTE] Quote requested for {}", ticker);

        let history = match self.market_data.fetch_history(&ticker).await {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    "⚠️ [QUOTE] {} history fetch failed via {}: {}",
                    ticker,
                    self.market_data.name(),
                    e
                );
                Vec::new()
            }
        };

        let Some(latest_close) = history.last().map(|p| p.close) else {
            info!("📈 [QUOTE] No history for {}", ticker);
            return QuoteOutcome::NotFound {
                message: not_found_message(&ticker),
            };
        };

        let rate = self.rates.latest_rate().await;
        let message = format_quote_message(&ticker, latest_close, rate, self.rates.pair());

        let chart = self.render_chart(&ticker, history).await;

        match (rate, chart) {
            (Some(_), Some(chart)) => {
                info!("✅ [QUOTE] {}", message);
                QuoteOutcome::Success { message, chart }
            }
            (_, chart) => {
                warn!(
                    "⚠️ [QUOTE] Degraded quote for {} (rate: {}, chart: {})",
                    ticker,
                    rate.is_some(),
                    chart.is_some()
                );
                QuoteOutcome::Degraded { message, chart }
            }
        }
    }

    async fn render_chart(&self, ticker: &str, history: Vec<PricePoint>) -> Option<ChartArtifact> {
        let renderer = self.renderer.clone();
        let pair = self.rates.pair().clone();
        let owned_ticker = ticker.to_string();

        let rendered = tokio::task::spawn_blocking(move || {
            renderer.render(&owned_ticker, &history, &pair)
        })
        .await
        .map_err(ChartError::from)
        .and_then(|r| r);

        match rendered {
            Ok(chart) => Some(chart),
            Err(e) => {
                warn!("⚠️ [CHART] Render failed for {}: {}", ticker, e);
                None
            }
        }
    }
}
