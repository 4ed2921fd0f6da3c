use std::{collections::BTreeSet, sync::Arc, sync::Mutex};

use quarry_core::{
    config::{ConnectionCategory, DatabaseConfig},
    err::{Context, Error, Result},
};
use quarry_logging::{debug, error, info, warn};

use super::{PoolManager, TxConfig, TxTemplate};

/// Creates or updates the database schema, runs once on start without a transaction
pub trait SchemeInitializer: Send + Sync {
    fn initialize(&self) -> Result<()>;
}

/// Loads initial data, runs once on start after the schema is ready
pub trait DataInitializer: Send + Sync {
    fn initialize_data(&self) -> Result<()>;
}

/// Initializer which does nothing
pub struct NoopInitializer;

impl SchemeInitializer for NoopInitializer {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }
}

impl DataInitializer for NoopInitializer {
    fn initialize_data(&self) -> Result<()> {
        Ok(())
    }
}

impl<F: Fn() -> Result<()> + Send + Sync> SchemeInitializer for F {
    fn initialize(&self) -> Result<()> {
        self()
    }
}

#[derive(Default)]
struct ManagerState {
    initialized: bool,
    starting: bool,
    supported: BTreeSet<ConnectionCategory>,
}

/// Owns the database lifecycle: starts pools and runs initializers
pub struct DatabaseManager {
    config: DatabaseConfig,
    pools: Vec<Arc<dyn PoolManager>>,
    scheme: Box<dyn SchemeInitializer>,
    data: Box<dyn DataInitializer>,
    tx: Arc<TxTemplate>,
    state: Mutex<ManagerState>,
}

impl DatabaseManager {
    pub fn new(
        config: DatabaseConfig,
        tx: Arc<TxTemplate>,
        scheme: Box<dyn SchemeInitializer>,
        data: Box<dyn DataInitializer>,
    ) -> Self {
        Self {
            config,
            pools: tx.pools().to_vec(),
            scheme,
            data,
            tx,
            state: Mutex::new(ManagerState::default()),
        }
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, ManagerState>> {
        self.state
            .lock()
            .map_err(|_| Error::msg("Failed to lock database manager state"))
    }

    /// Starts every pool, then runs the scheme and data initializers
    ///
    /// The initializers run without the manager state locked, so they may
    /// query the manager.
    pub fn start(&self) -> Result<()> {
        {
            let mut state = self.state()?;

            if state.initialized || state.starting {
                warn!("Duplicate initialization prevented. The database manager should not be started two or more times");
                return Ok(());
            }

            state.starting = true;
        }

        let res = self.open();

        {
            let mut state = self.state()?;
            state.starting = false;
            state.initialized = res.is_ok();
        }

        res?;
        self.data.initialize_data()
    }

    fn open(&self) -> Result<()> {
        info!("Opening database: '{}'", self.config.uri);

        let mut supported = BTreeSet::new();
        for pool in self.pools.iter() {
            pool.start(&self.config)?;
            supported.insert(pool.category());
        }

        debug!("Registered types: {:?}", supported);
        self.state()?.supported = supported;

        debug!("Initializing database: '{}'", self.config.uri);

        self.tx
            .do_in_transaction(TxConfig::notx(), || self.scheme.initialize())
            .context("Failed to initialize scheme")
    }

    /// Stops every pool, failures are logged and the remaining pools still stopped
    pub fn stop(&self) -> Result<()> {
        let mut state = self.state()?;

        if !state.initialized {
            return Ok(());
        }

        state.initialized = false;

        for pool in self.pools.iter() {
            if let Err(err) = pool.stop() {
                error!("Pool '{}' shutdown failed: {:?}", pool.category(), err);
            }
        }

        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.state().map(|s| s.initialized).unwrap_or(false)
    }

    /// Categories of the started pools
    pub fn supported_types(&self) -> Vec<ConnectionCategory> {
        self.state()
            .map(|s| s.supported.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_type_supported(&self, category: ConnectionCategory) -> bool {
        self.state()
            .map(|s| s.supported.contains(&category))
            .unwrap_or(false)
    }

    pub fn tx(&self) -> &Arc<TxTemplate> {
        &self.tx
    }
}
