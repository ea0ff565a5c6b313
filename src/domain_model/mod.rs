mod query;
mod session;
mod tile;

pub use query::*;
pub use session::*;
pub use tile::*;
