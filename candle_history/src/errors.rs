use chrono::{DateTime, Utc};
use snafu::{Backtrace, Snafu};

use crate::{config::ConfigError, providers::ProviderError};

/// Errors surfaced by a retrieval. Transient upstream failures never appear
/// here; they are retried inside the scheduler.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HistoryError {
    /// `start` is after `end`.
    #[snafu(display("Invalid range: start {start} is after end {end}"))]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        backtrace: Backtrace,
    },

    /// A non-retryable provider failure, including an unsupported timeframe.
    #[snafu(display("Provider error: {source}"))]
    Provider {
        #[snafu(backtrace)]
        source: ProviderError,
    },

    /// The configured attempt limit was reached on transient failures.
    #[snafu(display("Gave up after {attempts} failed attempts: {source}"))]
    RetriesExhausted {
        attempts: u32,
        #[snafu(backtrace)]
        source: ProviderError,
    },

    /// Invalid pipeline configuration.
    #[snafu(display("Configuration error: {source}"))]
    Config {
        source: ConfigError,
        backtrace: Backtrace,
    },
}
