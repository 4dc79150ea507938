use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Minimum-interval limiter for the geocoder. Every request goes to the
/// same host (Nominatim), whose usage policy is one request per second,
/// so a single shared timestamp is enough.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn wait_if_needed(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            min_interval: self.min_interval,
            last_request: self.last_request.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spaces_out_consecutive_calls() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait_if_needed().await;
        limiter.wait_if_needed().await;
        limiter.wait_if_needed().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.wait_if_needed().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
