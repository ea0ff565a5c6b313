//! Shows the structured log events of a session recovery, then of a session expiry.
//!
//! $ RUST_LOG=debug cargo run --bin logger_demo

use riskdesk::application_impl::*;
use riskdesk::application_port::{ExpiryHandler, RetryOptions};
use riskdesk::domain_model::TableOp;
use riskdesk::domain_port::TableClient;
use riskdesk::infra_memory::*;
use riskdesk::logger::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    info!("bootstrap filter active");

    logger.reload_from_config(&LogConfig {
        filter: "debug".to_string(),
    })?;

    let backend = Arc::new(MemoryBackend::new(Duration::from_secs(3600)));
    backend.seed("risks", vec![serde_json::json!({ "severity": "high" })]);
    let toasts = Arc::new(ToastFeed::new());
    let navigator = Arc::new(WatchNavigator::new("/dashboard"));
    let config = ExpiryConfig {
        redirect_delay: Duration::from_millis(50),
        ..ExpiryConfig::default()
    };
    let expiry: Arc<dyn ExpiryHandler> = Arc::new(RedirectingExpiryHandler::new(
        Arc::new(MemoryAuthCache::new()),
        toasts.clone(),
        navigator,
        config,
    ));
    let gate = Arc::new(SessionRefreshGate::new(backend.clone(), toasts));
    let interceptor = Arc::new(SessionInterceptor::new(
        gate,
        expiry,
        RetryOptions::new(2, Duration::from_millis(100)),
    ));
    let tables = RetryingTableClient::new(backend.clone(), interceptor);
    let select = || TableOp::Select {
        filters: Vec::new(),
        limit: None,
    };

    backend.sign_in("auditor@example.com");
    backend.expire_access_token();
    let rows = tables.query("risks", select()).await?;
    info!(rows = rows.len(), "recovered after refresh");

    backend.expire_access_token();
    backend.revoke_refresh_token();
    if let Err(e) = tables.query("risks", select()).await {
        warn!(error = %e, details = ?e.details, "session could not be recovered");
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    Ok(())
}
