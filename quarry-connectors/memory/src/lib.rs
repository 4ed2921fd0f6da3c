use quarry_connectors_base::interface::Connector;
use quarry_core::err::{Context, Result};

mod database;
pub use database::*;
mod connection;
pub use connection::*;
mod executor;
mod query;
pub use query::*;
mod result_set;
pub use result_set::*;

/// The connector for an in-memory dataset
/// Most useful for testing
#[derive(Default)]
pub struct MemoryConnector;

impl Connector for MemoryConnector {
    type TConnectionPool = MemoryConnectionPool;
    type TConnection = MemoryConnection;
    type TQueryHandle = MemoryQueryHandle;
    type TResultSet = MemoryResultSet;

    const TYPE: &'static str = "memory";

    fn create_connection_pool(uri: &str) -> Result<Self::TConnectionPool> {
        let name = uri
            .strip_prefix("memory:")
            .with_context(|| format!("Unsupported uri \"{}\", expected memory:<name>", uri))?;

        MemoryConnectionPool::new(MemoryDatabase::open(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_connector_create_pool() {
        let pool = MemoryConnector::create_connection_pool("memory:lib_test").unwrap();

        assert!(std::sync::Arc::ptr_eq(
            &pool.data(),
            &MemoryDatabase::open("lib_test").unwrap()
        ));
    }

    #[test]
    fn test_memory_connector_invalid_uri() {
        assert!(MemoryConnector::create_connection_pool("plocal:/tmp/db").is_err());
    }
}
