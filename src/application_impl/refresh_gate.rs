use crate::application_port::SessionRefresher;
use crate::domain_port::*;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

type PendingRefresh = Shared<BoxFuture<'static, bool>>;
type PendingSlot = Arc<Mutex<Option<PendingRefresh>>>;

/// Single-flight coalescer around the backend's session refresh.
///
/// While a refresh is outstanding every caller awaits the same outcome; no
/// second backend call is issued. Build one per application and share it.
pub struct SessionRefreshGate {
    client: Arc<dyn SessionClient>,
    toaster: Arc<dyn Toaster>,
    pending: PendingSlot,
}

/// Clears the pending slot once the refresh settles, including on panic.
struct InFlightGuard {
    slot: PendingSlot,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl SessionRefreshGate {
    pub fn new(client: Arc<dyn SessionClient>, toaster: Arc<dyn Toaster>) -> Self {
        Self {
            client,
            toaster,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn start(&self) -> PendingRefresh {
        let client = self.client.clone();
        let toaster = self.toaster.clone();
        let guard = InFlightGuard {
            slot: self.pending.clone(),
        };

        async move {
            let _guard = guard;
            match client.refresh_session().await {
                Ok(Some(session)) => {
                    info!(user_id = %session.user_id, "session refreshed");
                    toaster.success("Session refreshed");
                    true
                }
                Ok(None) => {
                    warn!("session refresh returned no session");
                    false
                }
                Err(e) => {
                    warn!(error = %e, "session refresh failed");
                    false
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[async_trait::async_trait]
impl SessionRefresher for SessionRefreshGate {
    async fn refresh(&self) -> bool {
        // Check and set under one lock so interleaved callers cannot both start a refresh.
        let pending = {
            let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    debug!("joining in-flight session refresh");
                    pending.clone()
                }
                None => {
                    debug!("starting session refresh");
                    let pending = self.start();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }
}
