use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct Windows {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window limiter keyed by client address.
#[derive(Debug, Clone)]
pub struct ClientRateLimiter {
    windows: Arc<Mutex<Windows>>,
    window: Duration,
    max_requests: usize,
}

impl ClientRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(Windows {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            window,
            max_requests,
        }
    }

    /// Records a hit for `client`, or returns how long until the oldest hit
    /// in the window expires.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock();
        let window = self.window;

        // drop clients whose whole window has lapsed, at most once per window
        if now.saturating_duration_since(windows.last_sweep) >= window {
            windows.hits.retain(|_, queue| {
                queue
                    .back()
                    .is_some_and(|latest| now.saturating_duration_since(*latest) < window)
            });
            windows.last_sweep = now;
        }

        let queue = windows.hits.entry(client.to_string()).or_default();
        while queue
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(*oldest) >= window)
        {
            queue.pop_front();
        }

        if queue.len() >= self.max_requests {
            let retry_after = queue
                .front()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            return Err(retry_after);
        }

        queue.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.lock().hits.len()
    }
}
