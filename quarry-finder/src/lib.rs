//! Compiles declared finder methods into cached execution descriptors
//! and dispatches calls through the executor for the right connection.
//!
//! A method is declared once through a [`MethodDefinition`]. On first use the
//! [`FinderDescriptorFactory`] analyzes it into an immutable [`FinderDescriptor`]
//! which is then reused for every call.

pub mod db;
pub mod descriptor;
pub mod err;
pub mod executor;
pub mod factory;
mod invoke;
pub mod method;
mod params;
pub mod placeholder;
pub mod repository;
pub mod result;
mod shape;
#[cfg(test)]
mod testing;
pub mod types;

pub use descriptor::*;
pub use err::FinderError;
pub use executor::*;
pub use factory::*;
pub use method::*;
pub use repository::*;
pub use result::*;
pub use types::*;
