use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::agents::Tool;
use crate::constants::tool::{STOCK_PRICE_DESCRIPTION, STOCK_PRICE_NAME};
use crate::services::quote::QuoteService;

/// Exposes quote retrieval to the agent; only the message text is returned
/// since the agent loop cannot consume images.
pub struct StockPriceTool {
    quotes: Arc<QuoteService>,
}

impl StockPriceTool {
    pub fn new(quotes: Arc<QuoteService>) -> Self {
        Self { quotes }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        STOCK_PRICE_NAME
    }

    fn description(&self) -> &str {
        STOCK_PRICE_DESCRIPTION
    }

    async fn call(&self, input: &str) -> String {
        // Models often wrap the argument in quotes
        let ticker = input.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
        info!("🛠️ [AGENT] {} invoked with {:?}", STOCK_PRICE_NAME, ticker);
        self.quotes.render_quote(ticker).await.message().to_string()
    }
}
