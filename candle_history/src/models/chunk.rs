//! One calendar day of requested history, the unit of fetching and caching.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed chunk length. No daylight-saving adjustment is applied per chunk.
pub const DAY_MILLIS: i64 = 86_400_000;

/// `[from, to)` spanning one day in the calendar frame, possibly clipped at
/// the end of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayChunk {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DayChunk {
    /// Full-length chunk beginning at `from`.
    pub fn starting_at(from: DateTime<Utc>) -> Self {
        Self {
            from,
            to: from + Duration::milliseconds(DAY_MILLIS),
        }
    }

    /// Same chunk with `to` pulled back to `end` if it overshoots.
    pub fn clipped_to(self, end: DateTime<Utc>) -> Self {
        Self {
            from: self.from,
            to: self.to.min(end),
        }
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// `from <= ts < to`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts < self.to
    }

    /// False for a chunk clipped short at the end of a window.
    pub fn is_full_day(&self) -> bool {
        self.duration() == Duration::milliseconds(DAY_MILLIS)
    }
}
