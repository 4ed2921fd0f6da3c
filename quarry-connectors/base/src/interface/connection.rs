use quarry_core::err::Result;

use crate::common::Command;

use super::QueryHandle;

/// Opens a connection to the target data source
pub trait ConnectionPool: Clone + Sized + Send + Sync + 'static {
    type TConnection: Connection;

    /// Acquires a connection to the target data source
    fn acquire(&mut self) -> Result<Self::TConnection>;
}

/// An open connection to a data source
pub trait Connection: Sized {
    type TQueryHandle: QueryHandle;

    /// Binds the supplied command to this connection, ready for execution
    fn prepare(&mut self, command: Command) -> Result<Self::TQueryHandle>;

    /// Gets the transaction manager if transactions are supported for this data source
    fn transaction_manager(&mut self) -> Option<&mut dyn TransactionManager>;
}

/// Manages transaction state for data sources
pub trait TransactionManager {
    /// Checks if the current connection is in a transaction
    fn is_in_transaction(&mut self) -> Result<bool>;

    /// Starts a transaction
    fn begin_transaction(&mut self) -> Result<()>;

    /// Rolls back the current transaction
    fn rollback_transaction(&mut self) -> Result<()>;

    /// Commits the current transaction
    fn commit_transaction(&mut self) -> Result<()>;
}
