use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Fixed-interval gate: consecutive acquisitions are spaced at least `interval` apart.
///
/// Spacing is measured start to start: the first acquisition goes through at once, and time
/// spent on the previous request counts towards the next wait.
///
/// There is only ever one request in flight, so the gate needs no locking; it is
/// owned by the fetcher and acquired before every network call.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Waits out whatever is left of the interval since the previous acquisition.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last {
            let ready_at = last + self.interval;
            if ready_at > Instant::now() {
                debug!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "pacing request");
                sleep_until(ready_at).await;
            }
        }
        self.last = Some(Instant::now());
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
