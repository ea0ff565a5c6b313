use crate::application_port::*;
use crate::domain_model::*;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Runs backend operations and recovers from expired sessions.
///
/// A session-class error triggers a refresh through the shared
/// [`SessionRefresher`] and a retry after a fixed delay. When the refresh
/// fails or the retry budget runs out the [`ExpiryHandler`] takes over and the
/// original error is returned. Other backend errors pass through untouched.
/// Transport failures are retried on the same budget without a refresh.
pub struct SessionInterceptor {
    refresher: Arc<dyn SessionRefresher>,
    expiry: Arc<dyn ExpiryHandler>,
    defaults: RetryOptions,
}

impl SessionInterceptor {
    pub fn new(
        refresher: Arc<dyn SessionRefresher>,
        expiry: Arc<dyn ExpiryHandler>,
        defaults: RetryOptions,
    ) -> Self {
        Self {
            refresher,
            expiry,
            defaults,
        }
    }

    pub async fn execute<T, F, Fut>(&self, op: F) -> QueryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        self.execute_with(op, &self.defaults).await
    }

    pub async fn execute_with<T, F, Fut>(&self, mut op: F, options: &RetryOptions) -> QueryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let err = match op().await {
                Ok(data) => return Ok(data),
                Err(err) => err,
            };

            if err.is_transport() {
                if attempt >= options.max_retries {
                    error!(attempt, error = %err, "operation failed, retries exhausted");
                    return Err(err);
                }
                warn!(attempt, error = %err, "operation failed, retrying");
            } else if !err.is_session_error() {
                return Err(err);
            } else if attempt >= options.max_retries {
                warn!(attempt, error = %err, "session retries exhausted");
                self.expiry.handle_expiry().await;
                return Err(err);
            } else {
                debug!(attempt, error = %err, "session error, refreshing");
                if !self.refresher.refresh().await {
                    warn!(error = %err, "session refresh failed");
                    self.expiry.handle_expiry().await;
                    return Err(err);
                }
            }

            attempt += 1;
            if let Some(on_retry) = &options.on_retry {
                on_retry(attempt);
            }
            tokio::time::sleep(options.retry_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    struct FakeRefresher {
        calls: AtomicUsize,
        succeed: bool,
    }

    #[async_trait::async_trait]
    impl SessionRefresher for FakeRefresher {
        async fn refresh(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.succeed
        }
    }

    #[derive(Default)]
    struct CountingExpiry {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ExpiryHandler for CountingExpiry {
        async fn handle_expiry(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        refresher: Arc<FakeRefresher>,
        expiry: Arc<CountingExpiry>,
        interceptor: SessionInterceptor,
    }

    impl Harness {
        fn new(refresh_succeeds: bool) -> Self {
            let refresher = Arc::new(FakeRefresher {
                calls: AtomicUsize::new(0),
                succeed: refresh_succeeds,
            });
            let expiry = Arc::new(CountingExpiry::default());
            let interceptor =
                SessionInterceptor::new(refresher.clone(), expiry.clone(), RetryOptions::default());
            Self {
                refresher,
                expiry,
                interceptor,
            }
        }

        fn refreshes(&self) -> usize {
            self.refresher.calls.load(Ordering::SeqCst)
        }

        fn expiries(&self) -> usize {
            self.expiry.calls.load(Ordering::SeqCst)
        }
    }

    /// Replays scripted results, repeating the last one when the script runs out.
    struct Script {
        results: Mutex<VecDeque<QueryResult<Vec<i32>>>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(results: Vec<QueryResult<Vec<i32>>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn next(&self) -> impl Future<Output = QueryResult<Vec<i32>>> + use<> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().unwrap();
            let result = if results.len() > 1 {
                results.pop_front().unwrap()
            } else {
                results.front().cloned().unwrap()
            };
            async move { result }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expired_jwt_is_refreshed_and_retried_once() {
        let harness = Harness::new(true);
        let script = Script::new(vec![
            Err(QueryError::response("JWT expired")),
            Ok(vec![1, 2, 3]),
        ]);

        let started = Instant::now();
        let result = harness.interceptor.execute(|| script.next()).await;

        assert_eq!(result, Ok(vec![1, 2, 3]));
        assert_eq!(script.calls(), 2);
        assert_eq!(harness.refreshes(), 1);
        assert_eq!(harness.expiries(), 0);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_session_error_exhausts_retries_then_expires() {
        let harness = Harness::new(true);
        let err = QueryError::response("invalid unauthorized token");
        let script = Script::new(vec![Err(err.clone())]);

        let result = harness.interceptor.execute(|| script.next()).await;

        assert_eq!(result, Err(err));
        assert_eq!(script.calls(), 3);
        assert_eq!(harness.refreshes(), 2);
        assert_eq!(harness.expiries(), 1);
    }

    #[tokio::test]
    async fn non_session_error_returns_immediately() {
        let harness = Harness::new(true);
        let err = QueryError::response("row not found").with_code("PGRST116");
        let script = Script::new(vec![Err(err.clone())]);

        let result = harness.interceptor.execute(|| script.next()).await;

        assert_eq!(result, Err(err));
        assert_eq!(script.calls(), 1);
        assert_eq!(harness.refreshes(), 0);
        assert_eq!(harness.expiries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_expires_with_original_error() {
        let harness = Harness::new(false);
        let err = QueryError::response("JWT expired").with_code("PGRST301");
        let script = Script::new(vec![Err(err.clone()), Ok(vec![1])]);

        let started = Instant::now();
        let result = harness.interceptor.execute(|| script.next()).await;

        assert_eq!(result, Err(err));
        assert_eq!(script.calls(), 1);
        assert_eq!(harness.refreshes(), 1);
        assert_eq!(harness.expiries(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn success_is_returned_regardless_of_budget() {
        for max_retries in [0, 1, 2, 10] {
            let harness = Harness::new(true);
            let script = Script::new(vec![Ok(vec![7])]);
            let options = RetryOptions::new(max_retries, Duration::from_millis(5));

            let result = harness
                .interceptor
                .execute_with(|| script.next(), &options)
                .await;

            assert_eq!(result, Ok(vec![7]));
            assert_eq!(script.calls(), 1);
            assert_eq!(harness.refreshes(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_bounds_operations_and_refreshes() {
        for max_retries in 0..5u32 {
            let harness = Harness::new(true);
            let script = Script::new(vec![Err(QueryError::response("x").with_code("401"))]);
            let options = RetryOptions::new(max_retries, Duration::from_millis(10));

            let _ = harness
                .interceptor
                .execute_with(|| script.next(), &options)
                .await;

            assert_eq!(script.calls(), max_retries as usize + 1);
            assert_eq!(harness.refreshes(), max_retries as usize);
            assert_eq!(harness.expiries(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn on_retry_receives_attempt_numbers() {
        let harness = Harness::new(true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let options = RetryOptions::new(3, Duration::from_millis(10)).on_retry({
            let seen = seen.clone();
            move |attempt| seen.lock().unwrap().push(attempt)
        });
        let script = Script::new(vec![
            Err(QueryError::response("token is expired")),
            Err(QueryError::response("token is expired")),
            Ok(vec![]),
        ]);

        let result = harness
            .interceptor
            .execute_with(|| script.next(), &options)
            .await;

        assert_eq!(result, Ok(vec![]));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_retry_without_refresh() {
        let harness = Harness::new(true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let options = RetryOptions::new(2, Duration::from_millis(10)).on_retry({
            let seen = seen.clone();
            move |attempt| seen.lock().unwrap().push(attempt)
        });
        let script = Script::new(vec![
            Err(QueryError::transport("connection reset")),
            Ok(vec![4]),
        ]);

        let result = harness
            .interceptor
            .execute_with(|| script.next(), &options)
            .await;

        assert_eq!(result, Ok(vec![4]));
        assert_eq!(script.calls(), 2);
        assert_eq!(harness.refreshes(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_surface_after_budget_without_expiry() {
        let harness = Harness::new(true);
        let err = QueryError::transport("connection refused");
        let script = Script::new(vec![Err(err.clone())]);

        let result = harness.interceptor.execute(|| script.next()).await;

        assert_eq!(result, Err(err));
        assert_eq!(script.calls(), 3);
        assert_eq!(harness.refreshes(), 0);
        assert_eq!(harness.expiries(), 0);
    }
}
