mod connection;
pub use connection::*;
mod query;
pub use query::*;
mod result_set;
pub use result_set::*;

use quarry_core::err::Result;

/// A common abstraction over the storage engines queries are executed against
pub trait Connector {
    type TConnectionPool: ConnectionPool<TConnection = Self::TConnection>;
    type TConnection: Connection<TQueryHandle = Self::TQueryHandle> + Send + 'static;
    type TQueryHandle: QueryHandle<TResultSet = Self::TResultSet>;
    type TResultSet: ResultSet;

    /// The type of the connector, usually the uri scheme it handles, eg 'memory'
    const TYPE: &'static str;

    /// Opens a connection pool to the database at the supplied uri
    fn create_connection_pool(uri: &str) -> Result<Self::TConnectionPool>;
}
