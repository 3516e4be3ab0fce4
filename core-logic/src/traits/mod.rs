use crate::error::NetworkError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// A configured HTTP client: base headers, timeout and proxy are already baked in.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POSTs `body` as JSON and returns the decoded JSON response.
    ///
    /// Timeouts, connection failures, non-2xx statuses and undecodable bodies
    /// are all reported as [`NetworkError`].
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, NetworkError>;
}

/// Wall-clock source, in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Suspension used for every pause between accounts and cycles.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
