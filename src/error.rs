//! Custom error types for the quote service
//!
//! Provider and rendering failures are typed here and resolved into
//! `QuoteOutcome` variants before they reach any adapter.

use thiserror::Error;

/// Market-data (price history) provider errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Network error fetching {ticker}: {source}")]
    Network {
        ticker: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} fetching {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("Upstream error for {ticker}: {code} - {description}")]
    Upstream {
        ticker: String,
        code: String,
        description: String,
    },

    #[error("Parse error for {ticker}: {reason}")]
    Parse { ticker: String, reason: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Exchange-rate provider errors
#[derive(Error, Debug)]
pub enum RateError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from rate provider")]
    Status { status: u16 },

    #[error("Rate for {base}->{target} missing from response")]
    MissingRate { base: String, target: String },

    #[error("Rate for {base}->{target} is not usable: {rate}")]
    InvalidRate {
        base: String,
        target: String,
        rate: f64,
    },
}

/// Chart rendering errors
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No price data to chart for {ticker}")]
    NoData { ticker: String },

    #[error("Chart I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Drawing failed: {0}")]
    Drawing(String),

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Language-model backend errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("OpenAI API error: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("LLM returned no choices")]
    EmptyResponse,

    #[error("LLM backend failed: {0}")]
    Backend(String),

    #[error("LLM queue unavailable: {0}")]
    Queue(String),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
