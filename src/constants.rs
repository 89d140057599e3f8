//! Application-wide constants
//!
//! Wire-level values and user-facing strings live here so the adapters and
//! tests agree on them.

use std::time::Duration;

/// Market-data provider constants
pub mod market_data {
    use super::*;

    pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

    /// Trailing window requested from the chart API (7 calendar days)
    pub const HISTORY_RANGE: &str = "7d";

    pub const HISTORY_INTERVAL: &str = "1d";

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Yahoo rejects requests without a browser-like agent
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    /// `chart.error.code` Yahoo returns for unknown symbols
    pub const NOT_FOUND_CODE: &str = "Not Found";
}

/// Exchange-rate provider constants
pub mod fx {
    use super::*;

    pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com";
    pub const DEFAULT_BASE: &str = "USD";
    pub const DEFAULT_TARGET: &str = "INR";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Chart rendering constants
pub mod chart {
    pub const DEFAULT_DIR: &str = "charts";
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 400;
}

/// User-facing messages shared by every adapter
pub mod messages {
    pub const MISSING_TICKER: &str = "Please provide a stock ticker symbol.";

    /// Placeholder for the converted price when no rate is available
    pub const UNAVAILABLE: &str = "Unavailable";
}

/// Agent tool registration
pub mod tool {
    pub const STOCK_PRICE_NAME: &str = "Stock Price Fetcher";
    pub const STOCK_PRICE_DESCRIPTION: &str =
        "Fetches and visualizes stock prices for a given ticker symbol.";
}
