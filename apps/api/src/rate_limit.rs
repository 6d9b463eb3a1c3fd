use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide request spacing: at most one accepted request per `interval`.
///
/// Stores the last accepted instant as milliseconds since `origin` (+1, so
/// zero means "never"), updated with compare-and-swap.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    origin: Instant,
    last_accepted: AtomicU64,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            origin: Instant::now(),
            last_accepted: AtomicU64::new(0),
        }
    }

    /// Returns `true` if the request may proceed.
    pub fn try_acquire(&self) -> bool {
        if self.interval.is_zero() {
            return true;
        }

        let now = self.origin.elapsed().as_millis() as u64 + 1;
        let last = self.last_accepted.load(Ordering::Acquire);

        if last != 0 && now.saturating_sub(last) < self.interval.as_millis() as u64 {
            return false;
        }

        self.last_accepted
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
