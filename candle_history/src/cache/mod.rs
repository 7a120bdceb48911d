//! Day-granular read-through/write-through candle cache.
//!
//! Each record holds the JSON-encoded candle list of one (ticker, interval,
//! day chunk). Records are written once and never updated: a past trading day
//! does not change. The chunk covering the caller's "today" is never written,
//! because its data is still incomplete, and neither is a chunk clipped short
//! at the end of a window, whose bounds differ from call to call.
//!
//! The cache is best effort. A missing record, a record that cannot be read,
//! and a record that does not decode are all misses; failed writes are logged
//! and otherwise ignored.

pub mod key;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    calendar::Calendar,
    models::{candle::Candle, chunk::DayChunk, timeframe::TimeFrame},
};

pub use key::CacheKey;
pub use store::{ByteStore, FsStore, MemoryStore, StoreError};

#[derive(Clone)]
pub struct DayCache {
    store: Arc<dyn ByteStore>,
}

impl DayCache {
    pub fn new(store: Arc<dyn ByteStore>) -> Self {
        Self { store }
    }

    pub async fn lookup(
        &self,
        ticker: &str,
        interval: TimeFrame,
        chunk: &DayChunk,
    ) -> Option<Vec<Candle>> {
        let key = CacheKey::new(ticker, interval, chunk);
        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice::<Vec<Candle>>(&bytes) {
            Ok(candles) => {
                debug!(%key, candles = candles.len(), "cache hit");
                Some(candles)
            }
            Err(e) => {
                warn!(%key, error = %e, "damaged cache record, treating as miss");
                None
            }
        }
    }

    /// Writes `candles` for `chunk` unless the chunk is clipped short or
    /// starts on the same calendar day as `as_of`. Returns whether a record
    /// was written.
    pub async fn store(
        &self,
        ticker: &str,
        interval: TimeFrame,
        chunk: &DayChunk,
        candles: &[Candle],
        as_of: DateTime<Utc>,
        calendar: &Calendar,
    ) -> bool {
        if !chunk.is_full_day() {
            debug!(from = %chunk.from, to = %chunk.to, "skipping cache write for a partial day");
            return false;
        }
        if calendar.same_day(chunk.from, as_of) {
            debug!(from = %chunk.from, "skipping cache write for the current day");
            return false;
        }

        let key = CacheKey::new(ticker, interval, chunk);
        let bytes = match serde_json::to_vec(candles) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%key, error = %e, "could not encode candles for cache");
                return false;
            }
        };

        match self.store.put(&key, bytes).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%key, error = %e, "cache write failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn candles(at: DateTime<Utc>) -> Vec<Candle> {
        vec![Candle {
            timestamp: at + Duration::hours(14) + Duration::minutes(30),
            open: 100.1,
            high: 101.7,
            low: 99.35,
            close: 101.2,
            volume: 12_345.0,
        }]
    }

    #[tokio::test]
    async fn stored_day_reads_back_identically() {
        let dir = TempDir::new().unwrap();
        let cache = DayCache::new(Arc::new(FsStore::new(dir.path())));
        let chunk = DayChunk::starting_at(day(8));
        let data = candles(day(8));

        assert!(cache.lookup("AAPL", TimeFrame::day(), &chunk).await.is_none());
        assert!(
            cache
                .store("AAPL", TimeFrame::day(), &chunk, &data, day(20), &Calendar::utc())
                .await
        );
        assert_eq!(
            cache.lookup("AAPL", TimeFrame::day(), &chunk).await,
            Some(data)
        );
    }

    #[tokio::test]
    async fn current_day_is_never_written() {
        let store = Arc::new(MemoryStore::new());
        let cache = DayCache::new(store.clone());
        let chunk = DayChunk::starting_at(day(8));
        let as_of = day(8) + Duration::hours(15);

        let written = cache
            .store("AAPL", TimeFrame::day(), &chunk, &candles(day(8)), as_of, &Calendar::utc())
            .await;

        assert!(!written);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clipped_day_is_never_written() {
        let store = Arc::new(MemoryStore::new());
        let cache = DayCache::new(store.clone());
        let chunk = DayChunk::starting_at(day(8)).clipped_to(day(8) + Duration::hours(15));

        let written = cache
            .store("AAPL", TimeFrame::day(), &chunk, &candles(day(8)), day(20), &Calendar::utc())
            .await;

        assert!(!written);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn damaged_record_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = DayCache::new(store.clone());
        let chunk = DayChunk::starting_at(day(8));
        store.insert_raw(
            CacheKey::new("AAPL", TimeFrame::day(), &chunk),
            b"{not json".to_vec(),
        );

        assert!(cache.lookup("AAPL", TimeFrame::day(), &chunk).await.is_none());
    }

    #[tokio::test]
    async fn intervals_do_not_share_records() {
        let store = Arc::new(MemoryStore::new());
        let cache = DayCache::new(store.clone());
        let chunk = DayChunk::starting_at(day(8));
        cache
            .store("AAPL", TimeFrame::day(), &chunk, &candles(day(8)), day(20), &Calendar::utc())
            .await;

        assert!(
            cache
                .lookup("AAPL", TimeFrame::minutes(5).unwrap(), &chunk)
                .await
                .is_none()
        );
        assert!(cache.lookup("MSFT", TimeFrame::day(), &chunk).await.is_none());
    }
}
