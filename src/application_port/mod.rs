mod dashboard_service;
mod session_service;

pub use dashboard_service::*;
pub use session_service::*;
