mod dashboard_service_impl;
mod expiry_handler_impl;
mod refresh_gate;
mod retrying_table_client;
mod session_interceptor;

pub use dashboard_service_impl::*;
pub use expiry_handler_impl::*;
pub use refresh_gate::*;
pub use retrying_table_client::*;
pub use session_interceptor::*;
