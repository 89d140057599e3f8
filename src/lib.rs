//! Stock Price Analyzer - quotes, currency conversion and trend charts
//!
//! This library provides the quote pipeline (market data, exchange rate,
//! chart rendering), the HTTP/UI adapters, and a conversational agent that
//! can call the quote pipeline as a tool.

pub mod agents;
pub mod api;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod llm;
pub mod services;
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use data::types::{CurrencyPair, PricePoint};
pub use services::chart::{ChartArtifact, ChartRenderer, PlottersRenderer};
pub use services::quote::{QuoteOutcome, QuoteService};
