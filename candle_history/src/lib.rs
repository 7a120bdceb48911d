//! Chunked, cached retrieval of historical OHLCV candles.
//!
//! A request is split into one-day chunks that are fetched in concurrent
//! batches. Failed batches are rewound to their checkpoint and retried with
//! exponential backoff. Completed past days are kept in a [`cache::DayCache`]
//! so repeated requests do not touch the network.

pub mod cache;
pub mod calendar;
pub mod chunker;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod history;
pub mod models;
pub mod progress;
pub mod providers;
pub mod scheduler;

pub use errors::HistoryError;
pub use history::HistoryClient;
