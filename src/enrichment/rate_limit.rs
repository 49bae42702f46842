//! Process-wide spacing of outbound provider calls.
//!
//! MusicBrainz allows one request per second per client. Every provider
//! call goes through a single [`RateLimiter`] constructed at startup and
//! shared by handle.
//!
//! The read-sleep-write sequence of [`RateLimiter::acquire`] runs while
//! holding one async mutex guard, so concurrent callers queue on the lock
//! instead of reading the same "last call" instant.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes callers to one per `min_interval`.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call is allowed, then record it.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!("Rate limiter sleeping {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Instant of the most recent call, if any.
    pub async fn last_call(&self) -> Option<Instant> {
        *self.last_call.lock().await
    }
}
