use std::{mem, sync::Arc};

use quarry_connectors_base::{
    common::Command,
    interface::{Connection, ConnectionPool, TransactionManager},
};
use quarry_core::err::{bail, Result};

use super::{MemoryDatabase, MemoryQueryHandle};

/// Hands out connections to a shared in-memory database
#[derive(Clone)]
pub struct MemoryConnectionPool {
    data: Arc<MemoryDatabase>,
}

impl MemoryConnectionPool {
    pub fn new(data: Arc<MemoryDatabase>) -> Result<Self> {
        Ok(Self { data })
    }

    pub fn data(&self) -> Arc<MemoryDatabase> {
        Arc::clone(&self.data)
    }
}

impl ConnectionPool for MemoryConnectionPool {
    type TConnection = MemoryConnection;

    fn acquire(&mut self) -> Result<MemoryConnection> {
        Ok(MemoryConnection::new(Arc::clone(&self.data)))
    }
}

pub struct MemoryConnection {
    pub data: Arc<MemoryDatabase>,
    transaction: Option<TransactionState>,
}

/// Snapshots taken when a transaction begins
///
/// Commands run against `commit_state` until the transaction ends,
/// `rollback_state` is kept to find the tables they changed.
pub struct TransactionState {
    rollback_state: MemoryDatabase,
    commit_state: Arc<MemoryDatabase>,
}

impl MemoryConnection {
    pub fn new(data: Arc<MemoryDatabase>) -> Self {
        Self {
            data,
            transaction: None,
        }
    }

    /// The database commands are currently executed against
    pub fn target(&self) -> Arc<MemoryDatabase> {
        match &self.transaction {
            Some(transaction) => Arc::clone(&transaction.commit_state),
            None => Arc::clone(&self.data),
        }
    }
}

impl Connection for MemoryConnection {
    type TQueryHandle = MemoryQueryHandle;

    fn prepare(&mut self, command: Command) -> Result<MemoryQueryHandle> {
        Ok(MemoryQueryHandle::new(command, self.target()))
    }

    fn transaction_manager(&mut self) -> Option<&mut dyn TransactionManager> {
        if self.data.conf().transactions_enabled {
            Some(self as &mut dyn TransactionManager)
        } else {
            None
        }
    }
}

impl TransactionState {
    pub fn new(current_state: MemoryDatabase) -> Self {
        let rollback_state = current_state.clone();
        let commit_state = Arc::new(current_state);

        Self {
            rollback_state,
            commit_state,
        }
    }
}

impl TransactionManager for MemoryConnection {
    fn is_in_transaction(&mut self) -> Result<bool> {
        Ok(self.transaction.is_some())
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            bail!("Transaction already in progress");
        }

        self.transaction = Some(TransactionState::new((*self.data).clone()));
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        if mem::take(&mut self.transaction).is_none() {
            bail!("No active transaction");
        }

        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        let trans = match mem::take(&mut self.transaction) {
            Some(trans) => trans,
            None => bail!("No active transaction"),
        };

        // Only tables changed inside the transaction are written back
        for table in trans.commit_state.tables() {
            let committed = trans.commit_state.get_data(&table);

            if committed != trans.rollback_state.get_data(&table) {
                if let Some(committed) = committed {
                    self.data.set_data(table, committed);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quarry_core::data::DataValue;

    use crate::MemoryTable;

    use super::*;

    fn setup_connection() -> MemoryConnection {
        let data = MemoryDatabase::new();
        data.set_data(
            "dummy",
            MemoryTable::new(vec!["x"], vec![vec![DataValue::UInt32(1)]]),
        );

        MemoryConnection::new(Arc::new(data))
    }

    #[test]
    fn test_memory_connector_connection_transactions_disabled() {
        let mut con = setup_connection();

        con.data.update_conf(|conf| {
            conf.transactions_enabled = false;
        });

        assert!(con.transaction_manager().is_none());
    }

    #[test]
    fn test_memory_connector_connection_transactions_enabled() {
        let mut con = setup_connection();

        assert!(con.transaction_manager().is_some());
    }

    #[test]
    fn test_memory_connector_connection_transaction_rollback() {
        let mut con = setup_connection();

        let orig = con.data.get_data("dummy").unwrap();

        assert_eq!(con.is_in_transaction().unwrap(), false);
        con.begin_transaction().unwrap();
        assert_eq!(con.is_in_transaction().unwrap(), true);

        con.target()
            .with_data_mut("dummy", |data| {
                data.rows[0][0] = DataValue::UInt32(123);
            })
            .unwrap();

        con.rollback_transaction().unwrap();
        assert_eq!(con.is_in_transaction().unwrap(), false);

        assert_eq!(con.data.get_data("dummy").unwrap(), orig);
    }

    #[test]
    fn test_memory_connector_connection_transaction_commit() {
        let mut con = setup_connection();

        con.begin_transaction().unwrap();

        con.target()
            .with_data_mut("dummy", |data| {
                data.rows[0][0] = DataValue::UInt32(123);
            })
            .unwrap();

        // Uncommitted changes are not visible outside the transaction
        assert_eq!(
            con.data.get_data("dummy").unwrap().rows,
            vec![vec![DataValue::UInt32(1)]]
        );

        con.commit_transaction().unwrap();
        assert_eq!(con.is_in_transaction().unwrap(), false);

        assert_eq!(
            con.data.get_data("dummy").unwrap().rows,
            vec![vec![DataValue::UInt32(123)]]
        );
    }

    #[test]
    fn test_memory_connector_connection_commit_keeps_other_tables() {
        let mut con = setup_connection();
        let mut other = MemoryConnection::new(Arc::clone(&con.data));

        con.begin_transaction().unwrap();
        other.begin_transaction().unwrap();

        other
            .target()
            .set_data("other", MemoryTable::new(vec!["y"], vec![]));
        other.commit_transaction().unwrap();

        con.target()
            .with_data_mut("dummy", |data| data.rows.clear())
            .unwrap();
        con.commit_transaction().unwrap();

        assert_eq!(con.data.tables(), vec!["dummy", "other"]);
        assert!(con.data.get_data("dummy").unwrap().rows.is_empty());
    }

    #[test]
    fn test_memory_connector_connection_commit_without_transaction() {
        let mut con = setup_connection();

        assert!(con.commit_transaction().is_err());
        assert!(con.rollback_transaction().is_err());
    }

    #[test]
    fn test_memory_connector_connection_nested_begin() {
        let mut con = setup_connection();

        con.begin_transaction().unwrap();
        assert!(con.begin_transaction().is_err());
    }
}
