//! Throttling for catalogue calls
//!
//! [`RateLimiter`] is a token bucket driven by an injectable [`Clock`], so the
//! pipeline can be exercised in tests without real waiting.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Monotonic time source plus the ability to wait on it
#[async_trait]
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `tokio::time`
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: `sleep` returns immediately after advancing time.
/// Every requested sleep is recorded for inspection.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_nanos: AtomicU64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.now_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos.load(Ordering::SeqCst))
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.advance(duration);
    }
}

/// Token bucket holding at most `capacity` tokens, one refilled per
/// `refill_interval`.
///
/// Tracked as the theoretical arrival time of the next request, which keeps
/// the arithmetic exact in `Duration`.
pub struct RateLimiter {
    capacity: u32,
    refill_interval: Duration,
    clock: Arc<dyn Clock>,
    next_free: tokio::sync::Mutex<Duration>,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity: capacity.max(1),
            refill_interval,
            clock,
            next_free: tokio::sync::Mutex::new(Duration::ZERO),
        }
    }

    /// One call every `interval`, no bursting
    pub fn fixed_interval(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::new(1, interval, clock)
    }

    /// Take a token, sleeping until one is available. Returns the time waited.
    pub async fn acquire(&self) -> Duration {
        let wait = {
            let mut next_free = self.next_free.lock().await;
            let now = self.clock.now();

            let arrival = (*next_free).max(now);
            let burst = self.refill_interval * (self.capacity - 1);
            let allowed_at = arrival.saturating_sub(burst);

            *next_free = arrival + self.refill_interval;
            allowed_at.saturating_sub(now)
        };

        if !wait.is_zero() {
            tracing::debug!("Rate limiting: waiting {:?}", wait);
            self.clock.sleep(wait).await;
        }

        wait
    }
}
