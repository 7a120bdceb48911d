use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timeframe::TimeFrame;

/// Parameters for a single upstream bars call.
///
/// This is what the pipeline hands to a
/// [`DataProvider`](crate::providers::DataProvider): one symbol, one interval,
/// and the absolute bounds of a single day chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g. `"AAPL"`).
    pub symbol: String,

    /// Bar interval. Validation of allowed values is performed by each
    /// provider according to its own API rules.
    pub timeframe: TimeFrame,

    /// Start of the requested range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested range (UTC).
    pub end: DateTime<Utc>,
}

/// Explicit-range retrieval: every candle with `start <= time <= end`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub ticker: String,
    pub interval: TimeFrame,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Trailing-window retrieval: `lookback_days` of history ending `gap_days`
/// before the as-of instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowRequest {
    pub ticker: String,
    pub interval: TimeFrame,
    pub lookback_days: u32,
    #[serde(default)]
    pub gap_days: u32,
}
