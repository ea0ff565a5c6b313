use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

pub const HOME_ROUTE: &str = "/dashboard";

pub struct App {
    pub backend: Arc<MemoryBackend>,
    pub tables: Arc<RetryingTableClient>,
    pub dashboard_service: Arc<dyn DashboardService>,
    pub refresh_gate: Arc<SessionRefreshGate>,
    pub interceptor: Arc<SessionInterceptor>,
    pub auth_cache: Arc<MemoryAuthCache>,
    pub navigator: Arc<WatchNavigator>,
    pub toasts: Arc<ToastFeed>,
    tiles: Vec<TileSpec>,
    auth_key: String,
}

impl App {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let backend = match settings.backend.backend.as_str() {
            "memory" => Arc::new(MemoryBackend::new(Duration::from_secs(
                settings.backend.access_ttl_secs,
            ))),
            other => return Err(anyhow::anyhow!("Unknown backend: {}", other)),
        };
        if let Some(path) = &settings.backend.seed_path {
            let seeded = backend.seed_from_file(path)?;
            info!(seeded, path = %path, "seeded memory backend");
        }

        let auth_cache = Arc::new(MemoryAuthCache::new());
        let navigator = Arc::new(WatchNavigator::new(HOME_ROUTE));
        let toasts = Arc::new(ToastFeed::new());

        let session_client: Arc<dyn SessionClient> = backend.clone();
        let table_client: Arc<dyn TableClient> = backend.clone();

        let refresh_gate = Arc::new(SessionRefreshGate::new(session_client, toasts.clone()));
        let expiry_handler: Arc<dyn ExpiryHandler> = Arc::new(RedirectingExpiryHandler::new(
            auth_cache.clone(),
            toasts.clone(),
            navigator.clone(),
            ExpiryConfig::from(&settings.expiry),
        ));
        let interceptor = Arc::new(SessionInterceptor::new(
            refresh_gate.clone(),
            expiry_handler,
            RetryOptions::from(&settings.retry),
        ));

        let tables = Arc::new(RetryingTableClient::new(table_client, interceptor.clone()));
        let dashboard_service: Arc<dyn DashboardService> =
            Arc::new(RealDashboardService::new(tables.clone()));

        let auth_key = settings
            .expiry
            .auth_key_prefixes
            .first()
            .map(|prefix| format!("{prefix}auth-token"))
            .unwrap_or_else(|| "auth-token".to_string());

        info!("app started");

        Ok(Self {
            backend,
            tables,
            dashboard_service,
            refresh_gate,
            interceptor,
            auth_cache,
            navigator,
            toasts,
            tiles: settings.tiles.clone(),
            auth_key,
        })
    }

    /// Signs in and caches the session the way the browser client would.
    pub fn sign_in(&self, email: &str) -> anyhow::Result<Session> {
        let session = self.backend.sign_in(email);
        self.auth_cache.set(
            StorageScope::Local,
            &self.auth_key,
            serde_json::to_string(&session)?,
        );
        Ok(session)
    }

    pub async fn current_session(&self) -> QueryResult<Option<Session>> {
        self.backend.get_session().await
    }

    pub fn tile_specs(&self) -> &[TileSpec] {
        &self.tiles
    }

    pub async fn dashboard(&self) -> QueryResult<Vec<Tile>> {
        self.dashboard_service.tiles(&self.tiles).await
    }
}
