use std::future::Future;
use std::time::Duration;

use tokio::time::{error::Elapsed, timeout, Instant};

/// Point in time by which a whole request must be answered. Nested calls
/// get `min(own cap, time left)`.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    pub fn cap(&self, limit: Duration) -> Duration {
        limit.min(self.remaining())
    }

    pub async fn run<F: Future>(&self, limit: Duration, future: F) -> Result<F::Output, Elapsed> {
        timeout(self.cap(limit), future).await
    }
}
