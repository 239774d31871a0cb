//! Process-wide rate limiting for the recognition service.
//!
//! The service has a single external quota, so every song shares one
//! [`RecognitionThrottle`]. A call waits until `min_interval` has passed
//! since the previous attempt finished. A failed call waits until
//! `retry_interval` has passed, then retries once; a second failure is
//! returned to the caller.
//!
//! The throttle holds its lock for the whole call, so parallel callers are
//! serialized and at most one request is ever in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::domain::ServiceError;
use crate::config::RecognitionConfig;

/// Monotonic time source, injectable for tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Shared recognition rate limiter.
pub struct RecognitionThrottle {
    min_interval: Duration,
    retry_interval: Duration,
    clock: Arc<dyn Clock>,
    /// End of the last attempt, successful or not
    last_call: Mutex<Option<Instant>>,
}

impl RecognitionThrottle {
    pub fn new(min_interval: Duration, retry_interval: Duration) -> Self {
        Self::with_clock(min_interval, retry_interval, Arc::new(TokioClock))
    }

    pub fn with_clock(
        min_interval: Duration,
        retry_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            min_interval,
            retry_interval,
            clock,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new(config.min_interval(), config.retry_interval())
    }

    async fn wait_since(&self, last: Option<Instant>, interval: Duration) {
        let Some(last) = last else {
            return;
        };
        let elapsed = self.clock.now().saturating_duration_since(last);
        if elapsed < interval {
            let wait = interval - elapsed;
            debug!(wait_secs = wait.as_secs_f64(), "Recognition throttle: waiting");
            self.clock.sleep(wait).await;
        }
    }

    /// Run `op` under the rate limit, retrying it once after a failure.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, ServiceError>> + Send,
        T: Send,
    {
        let mut last_call = self.last_call.lock().await;

        self.wait_since(*last_call, self.min_interval).await;
        let first = op().await;
        *last_call = Some(self.clock.now());

        let error = match first {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        warn!(error = %error, retry_in = ?self.retry_interval, "Recognition failed, retrying");
        self.wait_since(*last_call, self.retry_interval).await;
        let second = op().await;
        *last_call = Some(self.clock.now());
        second
    }
}
