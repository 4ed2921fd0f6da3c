pub(crate) mod ctx;
pub mod loader;
pub(crate) mod processor;

pub use loader::ConfigLoader;
