use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

pub type RetryCallback = Arc<dyn Fn(u32) + Send + Sync>;

#[derive(Clone)]
pub struct RetryOptions {
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Called with the attempt number (starting at 1) before each retry.
    pub on_retry: Option<RetryCallback>,
}

impl RetryOptions {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
            on_retry: None,
        }
    }

    pub fn on_retry(mut self, callback: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(callback));
        self
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Returns whether a session exists after the refresh attempt. Never fails.
    async fn refresh(&self) -> bool;
}

/// Terminal path once a session cannot be recovered.
#[async_trait::async_trait]
pub trait ExpiryHandler: Send + Sync {
    async fn handle_expiry(&self);
}
