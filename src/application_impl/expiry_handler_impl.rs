use crate::application_port::ExpiryHandler;
use crate::domain_port::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Clone)]
pub struct ExpiryConfig {
    pub login_route: String,
    pub redirect_delay: Duration,
    pub auth_key_prefixes: Vec<String>,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            login_route: "/auth".to_string(),
            redirect_delay: Duration::from_millis(1500),
            auth_key_prefixes: vec!["sb-".to_string(), "supabase.auth.".to_string()],
        }
    }
}

/// Clears cached auth state, tells the user, then sends them to the login route.
pub struct RedirectingExpiryHandler {
    cache: Arc<dyn AuthCache>,
    toaster: Arc<dyn Toaster>,
    navigator: Arc<dyn Navigator>,
    config: ExpiryConfig,
}

impl RedirectingExpiryHandler {
    pub fn new(
        cache: Arc<dyn AuthCache>,
        toaster: Arc<dyn Toaster>,
        navigator: Arc<dyn Navigator>,
        config: ExpiryConfig,
    ) -> Self {
        Self {
            cache,
            toaster,
            navigator,
            config,
        }
    }
}

#[async_trait::async_trait]
impl ExpiryHandler for RedirectingExpiryHandler {
    async fn handle_expiry(&self) {
        let removed: usize = StorageScope::ALL
            .iter()
            .map(|scope| {
                self.cache
                    .remove_prefixed(*scope, &self.config.auth_key_prefixes)
            })
            .sum();
        warn!(removed, "session expired, cleared cached auth state");

        self.toaster.error(SESSION_EXPIRED_MESSAGE);

        // The redirect waits so the toast gets a chance to render.
        let navigator = self.navigator.clone();
        let route = self.config.login_route.clone();
        let delay = self.config.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!(%route, "redirecting to sign-in");
            navigator.navigate(&route);
        });
    }
}
