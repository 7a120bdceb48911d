//! Batched, checkpointed retrieval of day chunks.
//!
//! The range is walked in batches of up to `batch_size` day chunks. All
//! fetches of a batch run concurrently and are awaited together. A batch is
//! all-or-nothing:
//!
//! - every fetch succeeded: its candles are committed, the checkpoint moves to
//!   the cursor and the backoff counter resets;
//! - any fetch failed with a fatal error: the retrieval stops with that error;
//! - otherwise the whole batch is dropped, the cursor goes back to the
//!   checkpoint and the scheduler sleeps `2^attempt × base` before retrying.
//!
//! Fetches of a failed batch that are still running are awaited and their
//! results discarded, never cancelled.

pub mod backoff;

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    chunker::RangeChunker,
    errors::{HistoryError, ProviderSnafu, RetriesExhaustedSnafu},
    fetcher::DayFetcher,
    models::{candle::Candle, chunk::DayChunk},
    progress::ProgressSink,
};

pub use backoff::Backoff;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(10);

/// Cursor/checkpoint bookkeeping of one retrieval.
///
/// Owned by a single retrieval call; nothing here is shared between calls.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    cursor: DateTime<Utc>,
    checkpoint: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    clip: bool,
    batch_size: usize,
    backoff: Backoff,
    days_committed: u64,
}

impl SchedulerState {
    /// `batch_size` of zero is treated as one.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        clip: bool,
        batch_size: usize,
        backoff_base: Duration,
    ) -> Self {
        Self {
            cursor: start,
            checkpoint: start,
            start,
            end,
            clip,
            batch_size: batch_size.max(1),
            backoff: Backoff::new(backoff_base),
            days_committed: 0,
        }
    }

    fn chunker_from(&self, cursor: DateTime<Utc>) -> RangeChunker {
        let chunker = RangeChunker::new(cursor, self.end);
        if self.clip { chunker.clipped() } else { chunker }
    }

    /// Day chunks in the whole range.
    pub fn total_days(&self) -> u64 {
        self.chunker_from(self.start).count() as u64
    }

    pub fn is_done(&self) -> bool {
        self.chunker_from(self.cursor).is_exhausted()
    }

    /// Starts a batch: records the checkpoint, takes up to `batch_size` chunks
    /// from the cursor and moves the cursor past them.
    pub fn enqueue(&mut self) -> Vec<DayChunk> {
        self.checkpoint = self.cursor;
        let mut chunker = self.chunker_from(self.cursor);
        let batch: Vec<DayChunk> = chunker.by_ref().take(self.batch_size).collect();
        self.cursor = chunker.cursor();
        batch
    }

    /// The in-flight batch of `days` chunks succeeded.
    pub fn commit(&mut self, days: usize) {
        self.checkpoint = self.cursor;
        self.backoff.reset();
        self.days_committed += days as u64;
    }

    /// The in-flight batch failed. Rewinds to the checkpoint and returns the
    /// delay before the next attempt.
    pub fn rewind(&mut self) -> Duration {
        self.cursor = self.checkpoint;
        self.backoff.record_failure()
    }

    pub fn cursor(&self) -> DateTime<Utc> {
        self.cursor
    }

    pub fn checkpoint(&self) -> DateTime<Utc> {
        self.checkpoint
    }

    pub fn attempt(&self) -> u32 {
        self.backoff.attempt()
    }

    pub fn days_committed(&self) -> u64 {
        self.days_committed
    }
}

/// Drives a [`SchedulerState`] to completion.
pub struct BatchScheduler {
    state: SchedulerState,
    max_attempts: Option<u32>,
}

impl BatchScheduler {
    pub fn new(state: SchedulerState, max_attempts: Option<u32>) -> Self {
        Self {
            state,
            max_attempts,
        }
    }

    /// Fetches every chunk of the range, returning committed candles in
    /// chunk order.
    pub async fn run(
        mut self,
        fetcher: &DayFetcher<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Candle>, HistoryError> {
        progress.set_total(self.state.total_days());
        let mut committed: Vec<Candle> = Vec::new();

        while !self.state.is_done() {
            let batch = self.state.enqueue();
            let results = join_all(batch.iter().map(|chunk| fetcher.fetch_day(*chunk))).await;

            let mut days = Vec::with_capacity(results.len());
            let mut failures = Vec::new();
            for result in results {
                match result {
                    Ok(candles) => days.push(candles),
                    Err(e) => failures.push(e),
                }
            }

            let failed = failures.len();
            let Some(last) = failures.pop() else {
                let fetched: usize = days.iter().map(Vec::len).sum();
                committed.extend(days.into_iter().flatten());
                self.state.commit(batch.len());
                progress.advance(batch.len() as i64);
                debug!(
                    days = batch.len(),
                    candles = fetched,
                    checkpoint = %self.state.checkpoint(),
                    "batch committed"
                );
                continue;
            };

            if !last.is_retryable() {
                warn!(error = %last, failed, "fatal provider error, aborting retrieval");
                return Err(last).context(ProviderSnafu);
            }
            if let Some(source) = failures.into_iter().find(|e| !e.is_retryable()) {
                warn!(error = %source, failed, "fatal provider error, aborting retrieval");
                return Err(source).context(ProviderSnafu);
            }

            let delay = self.state.rewind();
            progress.set_position(self.state.days_committed());
            let attempt = self.state.attempt();

            if let Some(max) = self.max_attempts {
                if attempt >= max {
                    return Err(last).context(RetriesExhaustedSnafu { attempts: attempt });
                }
            }

            warn!(
                attempt,
                failed,
                delay_secs = delay.as_secs(),
                checkpoint = %self.state.checkpoint(),
                error = %last,
                "batch failed, rewinding to checkpoint"
            );
            tokio::time::sleep(delay).await;
        }

        Ok(committed)
    }
}
