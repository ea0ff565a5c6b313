use crate::domain_port::*;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{error, info};

const FEED_CAPACITY: usize = 64;

/// Logs every toast, keeps a history and fans toasts out to subscribers.
pub struct ToastFeed {
    tx: broadcast::Sender<Toast>,
    history: Mutex<Vec<Toast>>,
}

impl ToastFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            tx,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    pub fn history(&self) -> Vec<Toast> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ToastFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl Toaster for ToastFeed {
    fn show(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => error!(message = %toast.message, "toast"),
            ToastLevel::Success => info!(message = %toast.message, "toast"),
        }
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast.clone());
        // No subscribers is fine.
        let _ = self.tx.send(toast);
    }
}
