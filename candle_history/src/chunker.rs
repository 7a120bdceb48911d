//! Range decomposition into consecutive one-day chunks.

use chrono::{DateTime, Utc};

use crate::models::chunk::DayChunk;

/// Iterator over the day chunks of a normalized `[start, end]` range.
///
/// Unclipped (the default) it yields chunks while the cursor is `<= end`, so a
/// chunk that starts exactly at `end` is still produced and the last chunk
/// may overshoot `end`. With [`clipped`](Self::clipped) it stops once the
/// cursor reaches `end` and pulls the final chunk's `to` back to `end`.
#[derive(Debug, Clone)]
pub struct RangeChunker {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    clip: bool,
}

impl RangeChunker {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            cursor: start,
            end,
            clip: false,
        }
    }

    pub fn clipped(mut self) -> Self {
        self.clip = true;
        self
    }

    /// Where the next chunk will start.
    pub fn cursor(&self) -> DateTime<Utc> {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        if self.clip {
            self.cursor >= self.end
        } else {
            self.cursor > self.end
        }
    }
}

impl Iterator for RangeChunker {
    type Item = DayChunk;

    fn next(&mut self) -> Option<DayChunk> {
        if self.is_exhausted() {
            return None;
        }
        let mut chunk = DayChunk::starting_at(self.cursor);
        self.cursor = chunk.to;
        if self.clip {
            chunk = chunk.clipped_to(self.end);
        }
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chunk::DAY_MILLIS;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn ten_day_range_yields_ten_contiguous_chunks() {
        let chunks: Vec<_> = RangeChunker::new(day(1), day(10)).collect();
        assert_eq!(chunks.len(), 10);
        assert_eq!(chunks[0].from, day(1));
        assert_eq!(chunks[9].from, day(10));
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        for c in &chunks {
            assert_eq!(c.duration().num_milliseconds(), DAY_MILLIS);
        }
    }

    #[test]
    fn single_day_range() {
        let chunks: Vec<_> = RangeChunker::new(day(5), day(5)).collect();
        assert_eq!(chunks, vec![DayChunk::starting_at(day(5))]);
    }

    #[test]
    fn clipped_range_stops_at_end() {
        let end = day(3) + Duration::hours(14);
        let chunks: Vec<_> = RangeChunker::new(day(1), end).clipped().collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].from, day(3));
        assert_eq!(chunks[2].to, end);

        // An end on a day boundary yields no empty trailing chunk.
        let chunks: Vec<_> = RangeChunker::new(day(1), day(3)).clipped().collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].to, day(3));
    }

    #[test]
    fn start_after_end_is_empty() {
        assert_eq!(RangeChunker::new(day(4), day(3)).count(), 0);
    }

    proptest! {
        #[test]
        fn chunks_cover_the_range_without_gaps(start_day in 1u32..28, len in 0i64..400) {
            let start = day(start_day);
            let end = start + Duration::days(len);
            let chunks: Vec<_> = RangeChunker::new(start, end).collect();

            prop_assert_eq!(chunks.len() as i64, len + 1);
            prop_assert_eq!(chunks.first().unwrap().from, start);
            prop_assert!(chunks.last().unwrap().to > end);
            for pair in chunks.windows(2) {
                prop_assert_eq!(pair[0].to, pair[1].from);
            }
        }
    }
}
