use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stock_price_analyzer::agents::{ConversationMemory, ReactAgent, StockPriceTool, Tool};
use stock_price_analyzer::api::{run_server, AppState};
use stock_price_analyzer::config::AppConfig;
use stock_price_analyzer::data::{CurrencyPair, HttpRateProvider, YahooClient};
use stock_price_analyzer::llm::{LLMClient, LLMQueue};
use stock_price_analyzer::services::chart::PlottersRenderer;
use stock_price_analyzer::services::quote::QuoteService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Stock Price Analyzer...");

    // Load Configuration
    let config = AppConfig::load()?;
    info!(
        "Loaded Configuration: server={} pair={}/{} chart_dir={}",
        config.bind_addr(),
        config.fx.base,
        config.fx.target,
        config.chart.dir
    );

    // Initialize Providers
    let market_data = Arc::new(YahooClient::new(
        &config.market_data.base_url,
        config.market_data.timeout(),
    )?);
    let pair = CurrencyPair::new(config.fx.base.clone(), config.fx.target.clone());
    let rates = Arc::new(HttpRateProvider::new(&config.fx.base_url, pair, config.fx.timeout())?);
    let renderer = Arc::new(PlottersRenderer::new(
        config.chart.dir.clone(),
        config.chart.width,
        config.chart.height,
    ));
    let quotes = Arc::new(QuoteService::new(market_data, rates, renderer));

    // Initialize Agent (optional)
    let agent = if config.llm.is_configured() {
        if let Some(url) = &config.llm.base_url {
            info!("Using Custom OpenAI Base URL: {}", url);
        }
        info!("Using LLM Model: {}", config.llm.model);
        info!(
            "📬 Initializing LLM Queue (max concurrent: {}, size: {})...",
            config.llm.max_concurrent, config.llm.queue_size
        );

        let client = Arc::new(LLMClient::from_config(&config.llm));
        let queue = Arc::new(LLMQueue::new(
            client,
            config.llm.max_concurrent,
            config.llm.queue_size,
        ));
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(StockPriceTool::new(quotes.clone()))];
        let memory = Arc::new(ConversationMemory::new(config.agent.memory_turns));

        Some(Arc::new(ReactAgent::new(
            queue,
            tools,
            memory,
            config.agent.max_iterations,
        )))
    } else {
        info!("ℹ️ No LLM configured - /chat is disabled (set OPENAI_API_KEY or OPENAI_BASE_URL)");
        None
    };

    // Create App State
    let app_state = Arc::new(AppState {
        chart_dir: config.chart.dir.clone().into(),
        quotes,
        agent,
        config,
    });

    // Start API Server
    info!("Initializing API Server...");
    run_server(app_state).await?;

    Ok(())
}
