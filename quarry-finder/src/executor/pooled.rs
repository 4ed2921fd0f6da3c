use std::sync::Arc;

use quarry_connectors_base::{
    common::Command,
    interface::{Connection, Connector, QueryHandle, ResultSet},
};
use quarry_core::{config::ConnectionCategory, data::Record, err::Result};
use quarry_logging::{debug, MaxLogLength};

use crate::{db::ConnectorPoolManager, types::EntityType};

use super::{AcceptRule, FinderExecutor};

/// Executes finder commands on the connection of a pool manager
pub struct PooledFinderExecutor<C: Connector> {
    category: ConnectionCategory,
    rule: AcceptRule,
    pool: Arc<ConnectorPoolManager<C>>,
}

impl<C: Connector> PooledFinderExecutor<C> {
    pub fn new(
        category: ConnectionCategory,
        rule: AcceptRule,
        pool: Arc<ConnectorPoolManager<C>>,
    ) -> Self {
        Self {
            category,
            rule,
            pool,
        }
    }

    /// Runs the callback with the live connection used for finder commands
    pub fn with_connection<R>(
        &self,
        cb: impl FnOnce(&mut C::TConnection) -> Result<R>,
    ) -> Result<R> {
        self.pool.with_connection(cb)
    }

    /// Binds the command to the connection, ready for execution
    pub fn prepare(con: &mut C::TConnection, command: Command) -> Result<C::TQueryHandle> {
        con.prepare(command)
    }
}

impl<C: Connector + 'static> FinderExecutor for PooledFinderExecutor<C> {
    fn category(&self) -> ConnectionCategory {
        self.category
    }

    fn accept(&self, entity: &EntityType) -> bool {
        self.rule.accept(entity)
    }

    fn execute(&self, command: Command) -> Result<Vec<Record>> {
        self.with_connection(|con| {
            let mut handle = Self::prepare(con, command)?;

            if let Ok(logged) = handle.logged() {
                debug!(
                    "Executing on {} connection: {:?}",
                    self.category,
                    MaxLogLength::new(Some(1024), &logged)
                );
            }

            handle.execute()?.read_all()
        })
    }
}
