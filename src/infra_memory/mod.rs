mod memory_auth_cache;
mod memory_backend;
mod toast_feed;
mod watch_navigator;

pub use memory_auth_cache::*;
pub use memory_backend::*;
pub use toast_feed::*;
pub use watch_navigator::*;
