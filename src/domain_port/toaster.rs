use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Transient user-visible notifications.
pub trait Toaster: Send + Sync {
    fn show(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.show(Toast {
            level: ToastLevel::Success,
            message: message.to_owned(),
        });
    }

    fn error(&self, message: &str) {
        self.show(Toast {
            level: ToastLevel::Error,
            message: message.to_owned(),
        });
    }
}
