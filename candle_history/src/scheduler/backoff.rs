use std::time::Duration;

/// Exponential backoff over consecutive batch failures.
///
/// The n-th consecutive failure waits `2^n × base`. A successful batch resets
/// the counter.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration) -> Self {
        Self { base, attempt: 0 }
    }

    /// Consecutive failures since the last success.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Counts a failure and returns how long to wait before retrying.
    pub fn record_failure(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        Self::delay_for(self.base, self.attempt)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn delay_for(base: Duration, attempt: u32) -> Duration {
        base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_per_consecutive_failure() {
        let mut backoff = Backoff::new(Duration::from_secs(10));
        assert_eq!(backoff.record_failure(), Duration::from_secs(20));
        assert_eq!(backoff.record_failure(), Duration::from_secs(40));
        assert_eq!(backoff.record_failure(), Duration::from_secs(80));
        assert_eq!(backoff.attempt(), 3);
    }

    #[test]
    fn success_resets_the_exponent() {
        let mut backoff = Backoff::new(Duration::from_secs(10));
        backoff.record_failure();
        backoff.record_failure();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.record_failure(), Duration::from_secs(20));
    }

    #[test]
    fn huge_attempt_counts_saturate() {
        let delay = Backoff::delay_for(Duration::from_secs(10), 200);
        assert_eq!(delay, Duration::from_secs(10).saturating_mul(u32::MAX));
    }
}
