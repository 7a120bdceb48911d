//! Public entry points of the pipeline.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use snafu::{ResultExt, ensure};
use tracing::{info, instrument};

use crate::{
    cache::DayCache,
    calendar::Calendar,
    config::PipelineSettings,
    errors::{HistoryError, InvalidRangeSnafu, ProviderSnafu},
    fetcher::DayFetcher,
    models::{
        candle::Candle,
        request_params::{HistoryRequest, WindowRequest},
        timeframe::TimeFrame,
    },
    progress::{NoProgress, ProgressSink},
    providers::DataProvider,
    scheduler::{BatchScheduler, SchedulerState},
};

/// Retrieves candle history through the day cache.
///
/// A client holds no per-retrieval state; concurrent calls on one client
/// each get their own cursor, checkpoint and backoff.
pub struct HistoryClient {
    provider: Arc<dyn DataProvider>,
    cache: DayCache,
    settings: PipelineSettings,
    progress: Arc<dyn ProgressSink>,
}

impl HistoryClient {
    pub fn new(provider: Arc<dyn DataProvider>, cache: DayCache, settings: PipelineSettings) -> Self {
        Self {
            provider,
            cache,
            settings,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Every candle of `request.ticker` with `start <= time <= end`.
    ///
    /// The range is widened to whole days for fetching and cut back to the
    /// requested bounds afterwards.
    #[instrument(skip(self), fields(ticker = %request.ticker, interval = %request.interval))]
    pub async fn fetch_range(
        &self,
        request: &HistoryRequest,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Candle>, HistoryError> {
        self.provider
            .validate_timeframe(&request.interval)
            .context(ProviderSnafu)?;
        ensure!(
            request.start <= request.end,
            InvalidRangeSnafu {
                start: request.start,
                end: request.end,
            }
        );

        let calendar = Calendar::resolve(self.settings.calendar_tz, request.start);
        let start = calendar.day_start(request.start);
        let end = calendar.day_start(request.end);

        let candles = self
            .run(&request.ticker, request.interval, calendar, start, end, false, as_of)
            .await?;

        let bounded: Vec<Candle> = candles
            .into_iter()
            .filter(|c| c.timestamp >= request.start && c.timestamp <= request.end)
            .collect();
        info!(candles = bounded.len(), "range retrieved");
        Ok(bounded)
    }

    /// The trailing `lookback_days` of history ending `gap_days` before
    /// `as_of`.
    ///
    /// With no gap, the end is pulled back by the availability lag so the
    /// most recent, not yet published, bars are not requested. The last day
    /// is fetched only up to the end. Results are not filtered.
    #[instrument(skip(self), fields(ticker = %request.ticker, interval = %request.interval))]
    pub async fn fetch_window(
        &self,
        request: &WindowRequest,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Candle>, HistoryError> {
        self.provider
            .validate_timeframe(&request.interval)
            .context(ProviderSnafu)?;

        let mut end = as_of - ChronoDuration::days(i64::from(request.gap_days));
        if request.gap_days == 0 {
            end -= ChronoDuration::from_std(self.settings.availability_lag)
                .unwrap_or(ChronoDuration::zero());
        }
        let raw_start = end - ChronoDuration::days(i64::from(request.lookback_days));
        let calendar = Calendar::resolve(self.settings.calendar_tz, raw_start);
        let start = calendar.day_start(raw_start);

        let candles = self
            .run(&request.ticker, request.interval, calendar, start, end, true, as_of)
            .await?;
        info!(candles = candles.len(), "window retrieved");
        Ok(candles)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        ticker: &str,
        interval: TimeFrame,
        calendar: Calendar,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        clip: bool,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Candle>, HistoryError> {
        let fetcher = DayFetcher {
            provider: self.provider.as_ref(),
            cache: &self.cache,
            calendar,
            as_of,
            ticker,
            interval,
        };
        let state = SchedulerState::new(
            start,
            end,
            clip,
            self.settings.batch_size,
            self.settings.backoff_base,
        );
        BatchScheduler::new(state, self.settings.max_attempts)
            .run(&fetcher, self.progress.as_ref())
            .await
    }
}
