pub mod fx;
pub mod types;
pub mod yahoo;

pub use fx::{HttpRateProvider, RateProvider};
pub use types::{CurrencyPair, PriceHistory, PricePoint};
pub use yahoo::{MarketDataProvider, YahooClient};
