//! Progress reporting for a retrieval, counted in days.
//!
//! The scheduler announces the total once, advances after every committed
//! batch, and moves the position back when a batch is discarded. Sinks must
//! therefore tolerate a position that goes down.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use tracing::info;

pub trait ProgressSink: Send + Sync {
    /// Number of day chunks the retrieval will process.
    fn set_total(&self, days: u64);

    /// Relative move. Negative on rewind.
    fn advance(&self, days: i64);

    /// Absolute position, used to rewind to the last checkpoint.
    fn set_position(&self, days: u64);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_total(&self, _days: u64) {}
    fn advance(&self, _days: i64) {}
    fn set_position(&self, _days: u64) {}
}

/// Logs progress through `tracing` at info level.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: AtomicU64,
    position: AtomicI64,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Relaxed)
    }
}

impl ProgressSink for LogProgress {
    fn set_total(&self, days: u64) {
        self.total.store(days, Ordering::Relaxed);
        self.position.store(0, Ordering::Relaxed);
        info!(total = days, "retrieval started");
    }

    fn advance(&self, days: i64) {
        let position = self.position.fetch_add(days, Ordering::Relaxed) + days;
        info!(
            position,
            total = self.total.load(Ordering::Relaxed),
            "days processed"
        );
    }

    fn set_position(&self, days: u64) {
        let days = i64::try_from(days).unwrap_or(i64::MAX);
        self.position.store(days, Ordering::Relaxed);
        info!(
            position = days,
            total = self.total.load(Ordering::Relaxed),
            "progress rewound"
        );
    }
}
