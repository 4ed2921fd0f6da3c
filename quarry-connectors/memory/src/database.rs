use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, RwLock},
};

use lazy_static::lazy_static;
use quarry_connectors_base::common::CommandParams;
use quarry_core::{
    data::{DataValue, Record},
    err::{bail, Error, Result},
};

// Named databases opened through `memory:<name>` uris live for the
// lifetime of the process, like an embedded in-memory engine would.
lazy_static! {
    static ref DATABASES: Mutex<HashMap<String, Arc<MemoryDatabase>>> =
        Mutex::new(HashMap::new());
}

/// A stored function, receives the bound parameters and returns rows
pub type MemoryFunction = Arc<dyn Fn(&CommandParams) -> Result<Vec<Record>> + Send + Sync>;

/// The in-memory data store, all data is stored in the data structure below
pub struct MemoryDatabase {
    /// Tabular data keyed by table name
    data: RwLock<HashMap<String, MemoryTable>>,
    /// Stored functions keyed by name
    functions: RwLock<HashMap<String, MemoryFunction>>,
    conf: RwLock<MemoryDatabaseConf>,
}

/// A table of rows with named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryTable {
    pub cols: Vec<String>,
    pub rows: Vec<Vec<DataValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDatabaseConf {
    pub transactions_enabled: bool,
}

impl Default for MemoryDatabaseConf {
    fn default() -> Self {
        Self {
            transactions_enabled: true,
        }
    }
}

impl MemoryTable {
    pub fn new(cols: Vec<&str>, rows: Vec<Vec<DataValue>>) -> Self {
        Self {
            cols: cols.into_iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn col_index(&self, col: &str) -> Option<usize> {
        self.cols.iter().position(|c| c.eq_ignore_ascii_case(col))
    }

    /// Converts the supplied row into a record keyed by the column names
    pub fn record(&self, row: &[DataValue]) -> Record {
        Record::new(self.cols.iter().cloned().zip(row.iter().cloned()).collect())
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            functions: RwLock::new(HashMap::new()),
            conf: RwLock::new(MemoryDatabaseConf::default()),
        }
    }

    /// Opens the named database, creating it on first use
    pub fn open(name: &str) -> Result<Arc<MemoryDatabase>> {
        if name.is_empty() {
            bail!("Memory database name must not be empty");
        }

        let mut dbs = DATABASES
            .lock()
            .map_err(|_| Error::msg("Failed to lock memory databases"))?;

        Ok(Arc::clone(
            dbs.entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryDatabase::new())),
        ))
    }

    /// Discards the named database, later opens start from an empty store
    pub fn drop_named(name: &str) -> Result<bool> {
        let mut dbs = DATABASES
            .lock()
            .map_err(|_| Error::msg("Failed to lock memory databases"))?;

        Ok(dbs.remove(name).is_some())
    }

    pub fn set_data(&self, table: impl Into<String>, data: MemoryTable) {
        let mut tables = self.data.write().unwrap();
        tables.insert(table.into(), data);
    }

    pub fn get_data(&self, table: &str) -> Option<MemoryTable> {
        self.with_data(table, |t| t.clone())
    }

    pub fn with_data<F: FnOnce(&MemoryTable) -> R, R>(&self, table: &str, cb: F) -> Option<R> {
        let tables = self.data.read().unwrap();
        let data = tables.get(table)?;

        Some(cb(data))
    }

    pub fn with_data_mut<F: FnOnce(&mut MemoryTable) -> R, R>(
        &self,
        table: &str,
        cb: F,
    ) -> Option<R> {
        let mut tables = self.data.write().unwrap();
        let data = tables.get_mut(table)?;

        Some(cb(data))
    }

    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<_> = self.data.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn register_function(
        &self,
        name: impl Into<String>,
        function: impl Fn(&CommandParams) -> Result<Vec<Record>> + Send + Sync + 'static,
    ) {
        let mut functions = self.functions.write().unwrap();
        functions.insert(name.into(), Arc::new(function));
    }

    pub fn function(&self, name: &str) -> Option<MemoryFunction> {
        self.functions.read().unwrap().get(name).cloned()
    }

    pub fn conf(&self) -> MemoryDatabaseConf {
        self.conf.read().unwrap().clone()
    }

    pub fn update_conf(&self, cb: impl FnOnce(&mut MemoryDatabaseConf)) {
        let mut conf = self.conf.write().unwrap();
        cb(&mut conf);
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryDatabase {
    fn clone(&self) -> Self {
        Self {
            data: RwLock::new(self.data.read().unwrap().clone()),
            functions: RwLock::new(self.functions.read().unwrap().clone()),
            conf: RwLock::new(self.conf()),
        }
    }
}

impl fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("tables", &self.tables())
            .field("conf", &self.conf())
            .finish()
    }
}
