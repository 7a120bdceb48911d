//! Calendar frame used for day boundaries, weekend detection and "today".
//!
//! A [`Calendar`] wraps a single [`FixedOffset`]. When built from an IANA zone
//! the offset is resolved once, at the instant the range begins, and then used
//! for every chunk of that retrieval. A range that crosses a DST transition
//! therefore keeps the offset it started with.

use chrono::{DateTime, Datelike, FixedOffset, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Resolve `tz` to the fixed offset in effect at `at`.
    pub fn resolve(tz: Tz, at: DateTime<Utc>) -> Self {
        Self {
            offset: tz.offset_from_utc_datetime(&at.naive_utc()).fix(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Midnight (in the calendar frame) of the day containing `ts`.
    pub fn day_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let local = ts.with_timezone(&self.offset);
        let midnight = local.date_naive().and_time(chrono::NaiveTime::MIN);
        // A fixed offset has no gaps or folds, so the mapping is always single.
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(ts)
    }

    /// Saturday or Sunday in the calendar frame. No trading data is expected.
    pub fn is_weekend(&self, ts: DateTime<Utc>) -> bool {
        matches!(
            ts.with_timezone(&self.offset).weekday(),
            Weekday::Sat | Weekday::Sun
        )
    }

    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        a.with_timezone(&self.offset).date_naive() == b.with_timezone(&self.offset).date_naive()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}
