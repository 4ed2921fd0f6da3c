use std::{
    collections::HashMap,
    sync::{Mutex, RwLock},
    thread::{self, ThreadId},
};

use quarry_connectors_base::interface::{Connection, ConnectionPool, Connector};
use quarry_core::{
    config::{ConnectionCategory, DatabaseConfig},
    err::{bail, Context, Error, Result},
};
use quarry_logging::{debug, info, warn};

use super::TxMode;

/// Manages the connection pool of one connection category
///
/// Connections are bound to the calling thread for the duration of a unit of work.
pub trait PoolManager: Send + Sync {
    fn category(&self) -> ConnectionCategory;

    /// Opens the pool against the configured database
    fn start(&self, config: &DatabaseConfig) -> Result<()>;

    /// Closes the pool, releasing every connection
    fn stop(&self) -> Result<()>;

    fn is_started(&self) -> bool;

    /// Binds a connection to the current thread, starting a transaction if requested
    fn begin(&self, mode: TxMode) -> Result<()>;

    /// Commits the current thread's transaction and releases its connection
    fn commit(&self) -> Result<()>;

    /// Rolls back the current thread's transaction and releases its connection
    fn rollback(&self) -> Result<()>;
}

struct BoundConnection<T> {
    /// Taken while the connection is in use
    con: Option<T>,
    transactional: bool,
}

/// Pool manager backed by a connector's connection pool
pub struct ConnectorPoolManager<C: Connector> {
    category: ConnectionCategory,
    pool: RwLock<Option<C::TConnectionPool>>,
    bound: Mutex<HashMap<ThreadId, BoundConnection<C::TConnection>>>,
}

impl<C: Connector> ConnectorPoolManager<C> {
    pub fn new(category: ConnectionCategory) -> Self {
        Self {
            category,
            pool: RwLock::new(None),
            bound: Mutex::new(HashMap::new()),
        }
    }

    fn acquire(&self) -> Result<C::TConnection> {
        let mut pool = self
            .pool
            .read()
            .map_err(|_| Error::msg("Failed to lock connection pool"))?
            .clone()
            .with_context(|| format!("The {} pool is not started", self.category))?;

        pool.acquire()
    }

    fn lock_bound(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ThreadId, BoundConnection<C::TConnection>>>>
    {
        self.bound
            .lock()
            .map_err(|_| Error::msg("Failed to lock bound connections"))
    }

    /// Runs the callback with the current thread's connection
    ///
    /// Outside of a unit of work a fresh connection is acquired for the call.
    pub fn with_connection<R>(
        &self,
        cb: impl FnOnce(&mut C::TConnection) -> Result<R>,
    ) -> Result<R> {
        let id = thread::current().id();

        let taken = match self.lock_bound()?.get_mut(&id) {
            Some(bound) => Some(
                bound
                    .con
                    .take()
                    .context("The bound connection is already in use on this thread")?,
            ),
            None => None,
        };

        let mut con = match taken {
            Some(con) => con,
            None => return cb(&mut self.acquire()?),
        };

        let res = cb(&mut con);

        if let Some(bound) = self.lock_bound()?.get_mut(&id) {
            bound.con = Some(con);
        }

        res
    }

    /// Whether the current thread has a connection bound
    pub fn is_bound(&self) -> bool {
        self.lock_bound()
            .map(|b| b.contains_key(&thread::current().id()))
            .unwrap_or(false)
    }

    fn release(&self, commit: bool) -> Result<()> {
        let id = thread::current().id();

        let bound = self
            .lock_bound()?
            .remove(&id)
            .with_context(|| format!("No {} connection bound to the current thread", self.category))?;

        if !bound.transactional {
            return Ok(());
        }

        let mut con = bound
            .con
            .context("The bound connection is still in use")?;

        if let Some(tm) = con.transaction_manager() {
            if commit {
                tm.commit_transaction()?;
            } else {
                tm.rollback_transaction()?;
            }
        }

        Ok(())
    }
}

impl<C: Connector> PoolManager for ConnectorPoolManager<C> {
    fn category(&self) -> ConnectionCategory {
        self.category
    }

    fn start(&self, config: &DatabaseConfig) -> Result<()> {
        let mut pool = self
            .pool
            .write()
            .map_err(|_| Error::msg("Failed to lock connection pool"))?;

        if pool.is_some() {
            warn!("The {} pool is already started", self.category);
            return Ok(());
        }

        *pool = Some(
            C::create_connection_pool(&config.uri)
                .with_context(|| format!("Failed to start {} pool", self.category))?,
        );

        info!(
            "Started {} pool ({}) for {}",
            self.category,
            C::TYPE,
            config.uri
        );
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut pool = self
            .pool
            .write()
            .map_err(|_| Error::msg("Failed to lock connection pool"))?;

        if pool.take().is_none() {
            return Ok(());
        }

        let mut bound = self.lock_bound()?;
        if !bound.is_empty() {
            warn!(
                "Stopping {} pool with {} connections still bound",
                self.category,
                bound.len()
            );
            bound.clear();
        }

        info!("Stopped {} pool", self.category);
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.pool.read().map(|p| p.is_some()).unwrap_or(false)
    }

    fn begin(&self, mode: TxMode) -> Result<()> {
        let id = thread::current().id();

        if self.lock_bound()?.contains_key(&id) {
            bail!(
                "A {} connection is already bound to the current thread",
                self.category
            );
        }

        let mut con = self.acquire()?;
        let mut transactional = false;

        if mode == TxMode::Transactional {
            match con.transaction_manager() {
                Some(tm) => {
                    tm.begin_transaction()?;
                    transactional = true;
                }
                None => debug!(
                    "The {} connection does not support transactions, running without",
                    self.category
                ),
            }
        }

        self.lock_bound()?.insert(
            id,
            BoundConnection {
                con: Some(con),
                transactional,
            },
        );

        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.release(true)
    }

    fn rollback(&self) -> Result<()> {
        self.release(false)
    }
}
