// backend

mod backend_client;

pub use backend_client::*;

// client state

mod auth_cache;
mod navigator;
mod toaster;

pub use auth_cache::*;
pub use navigator::*;
pub use toaster::*;
