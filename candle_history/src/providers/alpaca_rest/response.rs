use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    models::candle::Candle,
    providers::{InternalSnafu, ProviderError},
};

/// One bar as returned by the bars endpoint. The timestamp is kept as text
/// until it is mapped into a [`Candle`]. Trade count (`n`) and VWAP (`vw`)
/// have no place in a candle and are skipped.
#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: String,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    /// Absent or `null` when no symbol had data in the range.
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

impl AlpacaBar {
    pub fn into_candle(self) -> Result<Candle, ProviderError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| {
                InternalSnafu {
                    message: format!("bad bar timestamp {:?}: {e}", self.timestamp),
                }
                .build()
            })?
            .with_timezone(&Utc);

        Ok(Candle {
            timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}
