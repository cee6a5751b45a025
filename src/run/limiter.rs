//! Token bucket pacing the start of domain assessments.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{Instant, interval};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(100);

/// `rate` permits per `period`, at most `capacity` banked. A background task
/// refills the bucket until the limiter is dropped.
#[derive(Debug)]
pub struct RateLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
    shutdown: CancellationToken,
}

impl RateLimiter {
    /// Start a limiter. Returns `None` when `rate` is 0 (no limiting).
    ///
    /// The bucket starts full, so the first `capacity` acquisitions do not
    /// wait. Must be called from within a tokio runtime.
    pub fn start(rate: u32, period: Duration, capacity: usize) -> Option<Self> {
        if rate == 0 || period.is_zero() {
            return None;
        }
        let capacity = capacity.max(1);
        let permits = Arc::new(Semaphore::new(capacity));
        let shutdown = CancellationToken::new();

        let per_second = f64::from(rate) / period.as_secs_f64();
        let bucket = Arc::clone(&permits);
        let stop = shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = interval(TICK);
            let mut last = Instant::now();
            let mut fractional = 0.0f64;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        let due = per_second * now.duration_since(last).as_secs_f64() + fractional;
                        last = now;
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let whole = due as usize;
                        #[allow(clippy::cast_precision_loss)]
                        {
                            fractional = due - whole as f64;
                        }
                        let room = capacity.saturating_sub(bucket.available_permits());
                        if room == 0 {
                            // full bucket: nothing accrues
                            fractional = 0.0;
                        } else if whole > 0 {
                            bucket.add_permits(whole.min(room));
                        }
                    }
                    _ = stop.cancelled() => {
                        tracing::debug!("rate limiter stopped");
                        break;
                    }
                }
            }
        });

        tracing::debug!(rate, period_secs = period.as_secs_f64(), capacity, "rate limiter started");
        Some(Self {
            permits,
            capacity,
            shutdown,
        })
    }

    /// Wait for one permit and consume it.
    pub async fn acquire(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
