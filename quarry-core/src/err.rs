//! Error handling shared by every quarry crate.
//!
//! Infrastructure code (connectors, config, lifecycle) reports failures as
//! [`Error`] values carrying a context chain. Typed errors that callers need
//! to match on are defined by the crate that raises them and convert into
//! [`Error`] through `?`.

pub use anyhow::{anyhow, bail, ensure, Context, Error, Result};
