//! Integration tests for the quote pipeline and its HTTP surface.
//! Providers run against mock upstream servers; the router is bound on a
//! random local port and exercised over real HTTP.

use async_trait::async_trait;
use httpmock::Method::GET;
use httpmock::MockServer;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stock_price_analyzer::agents::{ConversationMemory, ReactAgent, StockPriceTool, Tool};
use stock_price_analyzer::api::{build_router, AppState};
use stock_price_analyzer::config::AppConfig;
use stock_price_analyzer::data::{CurrencyPair, HttpRateProvider, PricePoint, YahooClient};
use stock_price_analyzer::error::{ChartError, LlmError};
use stock_price_analyzer::llm::{ChatModel, ChatTurn};
use stock_price_analyzer::services::chart::{chart_file_name, ChartArtifact, ChartRenderer};
use stock_price_analyzer::services::quote::QuoteService;

const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

const AAPL_CHART: &str = r#"{
  "chart":{
    "result":[{
      "meta":{"currency":"USD","symbol":"AAPL"},
      "timestamp":[1700000000,1700086400,1700172800],
      "indicators":{"quote":[{"close":[148.5,149.25,150.0]}]}
    }],
    "error":null
  }
}"#;

const NOT_FOUND_CHART: &str = r#"{
  "chart":{
    "result":null,
    "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}
  }
}"#;

/// Writes a fixed PNG payload so tests do not depend on system fonts.
struct FileRenderer {
    dir: PathBuf,
}

impl ChartRenderer for FileRenderer {
    fn render(
        &self,
        ticker: &str,
        history: &[PricePoint],
        _pair: &CurrencyPair,
    ) -> Result<ChartArtifact, ChartError> {
        if history.is_empty() {
            return Err(ChartError::NoData {
                ticker: ticker.to_string(),
            });
        }
        std::fs::create_dir_all(&self.dir)?;
        let file_name = chart_file_name(ticker);
        let path = self.dir.join(&file_name);
        std::fs::write(&path, FAKE_PNG)?;
        Ok(ChartArtifact {
            path,
            file_name,
            png: FAKE_PNG.to_vec(),
        })
    }
}

/// Replays canned model replies in order.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(
        &self,
        _system_prompt: &str,
        _history: &[ChatTurn],
        _user_input: &str,
    ) -> Result<String, LlmError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Backend("script exhausted".into()))
    }
}

struct Upstream {
    market: MockServer,
    fx: MockServer,
}

async fn upstream(rate_ok: bool) -> Upstream {
    let market = MockServer::start_async().await;
    market
        .mock_async(|when, then| {
            when.method(GET).path("/v8/finance/chart/AAPL");
            then.status(200)
                .header("content-type", "application/json")
                .body(AAPL_CHART);
        })
        .await;
    market
        .mock_async(|when, then| {
            when.method(GET).path("/v8/finance/chart/ZZZZZZ");
            then.status(404)
                .header("content-type", "application/json")
                .body(NOT_FOUND_CHART);
        })
        .await;

    let fx = MockServer::start_async().await;
    fx.mock_async(|when, then| {
        when.method(GET).path("/v4/latest/USD");
        if rate_ok {
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"base":"USD","rates":{"USD":1,"INR":83.0}}"#);
        } else {
            then.status(500).body("upstream down");
        }
    })
    .await;

    Upstream { market, fx }
}

fn quote_service(upstream: &Upstream, chart_dir: &std::path::Path) -> Arc<QuoteService> {
    let market = YahooClient::new(&upstream.market.base_url(), Duration::from_secs(2)).unwrap();
    let rates = HttpRateProvider::new(
        &upstream.fx.base_url(),
        CurrencyPair::new("USD", "INR"),
        Duration::from_secs(2),
    )
    .unwrap();
    let renderer = FileRenderer {
        dir: chart_dir.to_path_buf(),
    };
    Arc::new(QuoteService::new(
        Arc::new(market),
        Arc::new(rates),
        Arc::new(renderer),
    ))
}

async fn spawn_app(quotes: Arc<QuoteService>, chart_dir: PathBuf, agent: Option<Arc<ReactAgent>>) -> String {
    let state = Arc::new(AppState {
        config: AppConfig::default(),
        quotes,
        chart_dir,
        agent,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

// ============= Quote Endpoint Tests =============

#[tokio::test]
async fn test_get_stock_price_success_and_chart_served() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let resp = reqwest::get(format!("{}/get_stock_price?ticker=aapl", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Stock price for AAPL: $150.00 (~₹12450.00).");

    let image = body["image"].as_str().unwrap();
    assert!(std::path::Path::new(image).exists());

    let chart_url = body["chart_url"].as_str().unwrap();
    let chart = reqwest::get(format!("{}{}", base, chart_url)).await.unwrap();
    assert_eq!(chart.status(), 200);
    assert_eq!(chart.headers()["content-type"], "image/png");
    assert_eq!(chart.bytes().await.unwrap().as_ref(), FAKE_PNG);
}

#[tokio::test]
async fn test_get_stock_price_missing_ticker() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    for query in ["", "?ticker=", "?ticker=%20%20"] {
        let resp = reqwest::get(format!("{}/get_stock_price{}", base, query)).await.unwrap();
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Please provide a stock ticker symbol.");
    }
}

#[tokio::test]
async fn test_get_stock_price_not_found() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let resp = reqwest::get(format!("{}/get_stock_price?ticker=ZZZZZZ", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "No data found for ZZZZZZ. Please check the ticker symbol."
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_get_stock_price_rate_unavailable_still_charts() {
    let upstream = upstream(false).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let resp = reqwest::get(format!("{}/get_stock_price?ticker=AAPL", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Stock price for AAPL: $150.00 (~₹Unavailable).");
    assert!(body["image"].is_string());
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_charts() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let url = format!("{}/get_stock_price?ticker=AAPL", base);
    let (a, b) = tokio::join!(reqwest::get(&url), reqwest::get(&url));
    let a: serde_json::Value = a.unwrap().json().await.unwrap();
    let b: serde_json::Value = b.unwrap().json().await.unwrap();

    assert_eq!(a["message"], b["message"]);
    assert_ne!(a["image"], b["image"]);
}

// ============= Chart / Health Tests =============

#[tokio::test]
async fn test_chart_unknown_and_invalid_names() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let missing = reqwest::get(format!("{}/charts/NOPE_1.png", base)).await.unwrap();
    assert_eq!(missing.status(), 404);

    let traversal = reqwest::get(format!("{}/charts/..%2Fsecret", base)).await.unwrap();
    assert_eq!(traversal.status(), 400);
}

#[tokio::test]
async fn test_health() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

// ============= UI Tests =============

#[tokio::test]
async fn test_ui_initial_page_and_submit() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let page = reqwest::get(format!("{}/", base)).await.unwrap().text().await.unwrap();
    assert!(page.contains("📈 Stock Price Analyzer"));
    assert!(page.contains(r#"value="AAPL""#));
    assert!(!page.contains("<img"));

    let page = reqwest::get(format!("{}/?ticker=AAPL", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Stock price for AAPL: $150.00 (~₹12450.00)."));
    assert!(page.contains(r#"<img src="/charts/AAPL_"#));
    assert!(page.contains("Price Trend of AAPL"));
}

// ============= Agent Tests =============

#[tokio::test]
async fn test_stock_tool_returns_message_text() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let tool = StockPriceTool::new(quote_service(&upstream, dir.path()));

    assert_eq!(tool.name(), "Stock Price Fetcher");
    assert_eq!(
        tool.call("\"AAPL\"").await,
        "Stock price for AAPL: $150.00 (~₹12450.00)."
    );
    assert_eq!(tool.call("  ").await, "Please provide a stock ticker symbol.");
}

#[tokio::test]
async fn test_chat_without_model_is_unavailable() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_app(quote_service(&upstream, dir.path()), dir.path().to_path_buf(), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({ "message": "price of AAPL?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn test_chat_agent_uses_stock_tool() {
    let upstream = upstream(true).await;
    let dir = tempfile::tempdir().unwrap();
    let quotes = quote_service(&upstream, dir.path());

    let model = ScriptedModel::new(&[
        "Thought: I should look up the price.\nAction: Stock Price Fetcher\nAction Input: AAPL",
        "Thought: I now know the final answer\nFinal Answer: AAPL trades at $150.00.",
    ]);
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(StockPriceTool::new(quotes.clone()))];
    let agent = Arc::new(ReactAgent::new(
        model,
        tools,
        Arc::new(ConversationMemory::new(20)),
        5,
    ));
    let base = spawn_app(quotes, dir.path().to_path_buf(), Some(agent.clone())).await;
    let client = reqwest::Client::new();

    let empty = client
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({ "message": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), 400);

    let resp = client
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({ "message": "What is AAPL trading at?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["reply"], "AAPL trades at $150.00.");
    assert_eq!(body["steps"][0]["tool"], "Stock Price Fetcher");
    assert_eq!(
        body["steps"][0]["observation"],
        "Stock price for AAPL: $150.00 (~₹12450.00)."
    );
    assert_eq!(agent.memory().len(), 2);

    // Script is exhausted, so the backend now fails
    let failed = client
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({ "message": "again?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(failed.status(), 502);
}
