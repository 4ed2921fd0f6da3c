//! Database lifecycle: connection pools, transaction scoping and startup initialization

mod manager;
mod pool;
mod tx;

pub use manager::*;
pub use pool::*;
pub use tx::*;
