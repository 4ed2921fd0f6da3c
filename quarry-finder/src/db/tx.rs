use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    thread::{self, ThreadId},
};

use quarry_core::err::{Error, Result};
use quarry_logging::{debug, error, trace};

use super::PoolManager;

/// How a unit of work interacts with transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Connections are bound without a transaction, required for schema changes
    NoTx,
    /// Work is committed on success and rolled back on failure
    Transactional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxConfig {
    pub mode: TxMode,
}

impl TxConfig {
    pub fn new(mode: TxMode) -> Self {
        Self { mode }
    }

    pub fn notx() -> Self {
        Self::new(TxMode::NoTx)
    }
}

impl Default for TxConfig {
    fn default() -> Self {
        Self::new(TxMode::Transactional)
    }
}

/// Runs units of work against every started pool
///
/// A unit of work is scoped to the calling thread. Nested calls join the
/// outer unit of work, whatever their own config.
pub struct TxTemplate {
    pools: Vec<Arc<dyn PoolManager>>,
    active: Mutex<HashMap<ThreadId, TxMode>>,
}

impl TxTemplate {
    pub fn new(pools: Vec<Arc<dyn PoolManager>>) -> Self {
        Self {
            pools,
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn pools(&self) -> &[Arc<dyn PoolManager>] {
        &self.pools
    }

    /// The mode of the current thread's unit of work, if one is active
    pub fn current(&self) -> Option<TxMode> {
        self.active
            .lock()
            .ok()
            .and_then(|a| a.get(&thread::current().id()).copied())
    }

    pub fn do_in_transaction<R>(
        &self,
        config: TxConfig,
        work: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        let id = thread::current().id();

        if let Some(mode) = self.current() {
            trace!("Joining active {:?} unit of work", mode);
            return work();
        }

        let mut unit = UnitOfWork {
            template: self,
            id,
            pools: Vec::with_capacity(self.pools.len()),
            finished: false,
        };

        for pool in self.pools.iter().filter(|p| p.is_started()) {
            if let Err(err) = pool.begin(config.mode) {
                unit.finish(false);
                return Err(err);
            }
            unit.pools.push(pool);
        }

        self.set_active(id, config.mode)?;
        debug!("Started {:?} unit of work", config.mode);

        match work() {
            Ok(value) => match unit.finish(true).into_iter().next() {
                Some(err) => Err(err.context("Failed to commit unit of work")),
                None => Ok(value),
            },
            Err(err) => {
                debug!("Rolling back unit of work after error: {}", err);
                unit.finish(false);
                Err(err)
            }
        }
    }

    /// Commits or rolls back each pool, continuing past failures
    fn finish(pools: &[&Arc<dyn PoolManager>], commit: bool) -> Vec<Error> {
        let mut failures = vec![];

        for pool in pools {
            let res = if commit && failures.is_empty() {
                pool.commit()
            } else {
                pool.rollback()
            };

            if let Err(err) = res {
                error!(
                    "Failed to {} {} connection: {:?}",
                    if commit { "commit" } else { "rollback" },
                    pool.category(),
                    err
                );
                failures.push(err);
            }
        }

        failures
    }

    fn set_active(&self, id: ThreadId, mode: TxMode) -> Result<()> {
        self.active
            .lock()
            .map_err(|_| Error::msg("Failed to lock active units of work"))?
            .insert(id, mode);

        Ok(())
    }

    fn clear_active(&self, id: ThreadId) {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id);
    }
}

/// The pools bound by one unit of work
///
/// Dropping an unfinished unit, eg when the work panics, rolls it back.
struct UnitOfWork<'a> {
    template: &'a TxTemplate,
    id: ThreadId,
    pools: Vec<&'a Arc<dyn PoolManager>>,
    finished: bool,
}

impl UnitOfWork<'_> {
    fn finish(&mut self, commit: bool) -> Vec<Error> {
        self.finished = true;
        self.template.clear_active(self.id);
        TxTemplate::finish(&self.pools, commit)
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.finished {
            error!("Unit of work was abandoned, rolling back");
            self.finish(false);
        }
    }
}
