use crate::domain_port::Navigator;
use tokio::sync::watch;
use tracing::debug;

/// Holds the current route and publishes changes to subscribers.
pub struct WatchNavigator {
    tx: watch::Sender<String>,
}

impl WatchNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(initial.into());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Navigator for WatchNavigator {
    fn navigate(&self, route: &str) {
        debug!(route, "navigate");
        self.tx.send_replace(route.to_owned());
    }

    fn current_route(&self) -> String {
        self.tx.borrow().clone()
    }
}
