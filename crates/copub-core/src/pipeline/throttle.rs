//! Fixed spacing between consecutive upstream requests

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum delay between calls to [`Throttle::wait`]
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    /// Sleep until `delay` has passed since the previous call. The first call never sleeps.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.delay).await;
        }
        self.last = Some(Instant::now());
    }
}
