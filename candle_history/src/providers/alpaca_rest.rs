//! Alpaca Market Data v2 (`/v2/stocks/bars`) provider.

pub mod params;
pub mod provider;
pub mod response;

pub use params::{Adjustment, AlpacaSettings, Feed};
pub use provider::AlpacaProvider;
