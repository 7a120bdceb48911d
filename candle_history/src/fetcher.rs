//! Per-day fetch: weekend short-circuit, cache, upstream, cache write.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::{
    cache::DayCache,
    calendar::Calendar,
    models::{
        candle::Candle, chunk::DayChunk, request_params::BarsRequestParams, timeframe::TimeFrame,
    },
    providers::{DataProvider, ProviderError},
};

/// Everything needed to fetch the days of one retrieval.
pub struct DayFetcher<'a> {
    pub provider: &'a dyn DataProvider,
    pub cache: &'a DayCache,
    pub calendar: Calendar,
    pub as_of: DateTime<Utc>,
    pub ticker: &'a str,
    pub interval: TimeFrame,
}

impl DayFetcher<'_> {
    /// Candles for one day chunk.
    ///
    /// Weekends return an empty list without touching the cache or the
    /// provider. A cache hit is returned as stored. Otherwise one upstream
    /// call is made, bars outside `[from, to)` are dropped and, unless the
    /// chunk is today or clipped, the result is cached.
    #[instrument(level = "debug", skip(self), fields(ticker = %self.ticker, interval = %self.interval))]
    pub async fn fetch_day(&self, chunk: DayChunk) -> Result<Vec<Candle>, ProviderError> {
        if self.calendar.is_weekend(chunk.from) {
            debug!("weekend, skipping");
            return Ok(Vec::new());
        }

        if let Some(candles) = self.cache.lookup(self.ticker, self.interval, &chunk).await {
            return Ok(candles);
        }

        let mut candles = self
            .provider
            .fetch_bars(BarsRequestParams {
                symbol: self.ticker.to_string(),
                timeframe: self.interval,
                start: chunk.from,
                end: chunk.to,
            })
            .await?;
        // Upstream bounds are inclusive; a bar stamped at `to` belongs to the
        // next chunk.
        let fetched = candles.len();
        candles.retain(|c| chunk.contains(c.timestamp));
        if candles.len() < fetched {
            debug!(dropped = fetched - candles.len(), "discarded bars outside the chunk");
        }

        self.cache
            .store(
                self.ticker,
                self.interval,
                &chunk,
                &candles,
                self.as_of,
                &self.calendar,
            )
            .await;

        Ok(candles)
    }
}
