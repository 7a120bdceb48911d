//! Canonical in-memory representation of a time-series candle (OHLCV).
//!
//! Every [`DataProvider`](crate::providers::DataProvider) maps its native bar
//! format into this struct, and the day cache stores lists of it verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV candle.
///
/// Serializes with `time` as epoch milliseconds so cached payloads stay
/// independent of any provider's timestamp format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the candle interval (UTC).
    #[serde(rename = "time", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the interval.
    pub high: f64,

    /// Lowest price during the interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the interval.
    pub volume: f64,
}

impl Candle {
    /// Candle start as milliseconds since the Unix epoch.
    pub fn time_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
