use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};

use crate::models::{chunk::DayChunk, timeframe::TimeFrame};

const KEY_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

/// Address of one cached day chunk: ticker, interval and the chunk bounds.
///
/// Rendered as `<ticker>/<interval>/<from>_<to>.json`. The ticker is
/// percent-encoded (dots included) so any symbol maps to a single path
/// segment, and the bounds keep millisecond precision so a clipped chunk never
/// shares a key with the full day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub interval: TimeFrame,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl CacheKey {
    pub fn new(ticker: &str, interval: TimeFrame, chunk: &DayChunk) -> Self {
        Self {
            ticker: ticker.to_string(),
            interval,
            from: chunk.from,
            to: chunk.to,
        }
    }

    fn ticker_segment(&self) -> String {
        urlencoding::encode(&self.ticker).replace('.', "%2E")
    }

    fn file_name(&self) -> String {
        format!(
            "{}_{}.json",
            self.from.format(KEY_TIME_FORMAT),
            self.to.format(KEY_TIME_FORMAT)
        )
    }

    /// Path of the record relative to a store root.
    pub fn relative_path(&self) -> PathBuf {
        [
            self.ticker_segment(),
            self.interval.to_string(),
            self.file_name(),
        ]
        .iter()
        .collect()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.ticker_segment(),
            self.interval,
            self.file_name()
        )
    }
}
