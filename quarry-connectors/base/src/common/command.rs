use std::{collections::BTreeMap, fmt};

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use quarry_core::data::DataValue;
use serde::Serialize;

/// A command submitted to a connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// What to execute
    pub source: CommandSource,
    /// The values bound to the parameters of the command
    pub params: CommandParams,
    /// Number of leading rows to discard
    pub skip: Option<u64>,
    /// Maximum number of rows to return
    pub limit: Option<u64>,
}

/// The executable part of a command
#[derive(Debug, Clone, PartialEq, Serialize, EnumAsInner)]
pub enum CommandSource {
    /// Raw query text understood by the storage engine
    Query(String),
    /// The name of a stored function
    Function(String),
}

/// Parameters bound to a command
///
/// Commands either bind every parameter by position or every parameter by name.
#[derive(Debug, Clone, PartialEq, Serialize, EnumAsInner)]
pub enum CommandParams {
    Ordinal(Vec<DataValue>),
    Named(BTreeMap<String, DataValue>),
}

impl Command {
    pub fn query(query: impl Into<String>) -> Self {
        Self::new(CommandSource::Query(query.into()))
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(CommandSource::Function(name.into()))
    }

    fn new(source: CommandSource) -> Self {
        Self {
            source,
            params: CommandParams::Ordinal(vec![]),
            skip: None,
            limit: None,
        }
    }

    pub fn with_params(mut self, params: CommandParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_skip(mut self, skip: Option<u64>) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// The query text or function name
    pub fn text(&self) -> &str {
        match &self.source {
            CommandSource::Query(q) => q,
            CommandSource::Function(f) => f,
        }
    }
}

impl CommandParams {
    pub fn len(&self) -> usize {
        match self {
            CommandParams::Ordinal(p) => p.len(),
            CommandParams::Named(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders each parameter for logging
    pub fn logged(&self) -> Vec<String> {
        match self {
            CommandParams::Ordinal(p) => p.iter().map(|v| format!("{:?}", v)).collect(),
            CommandParams::Named(p) => p.iter().map(|(k, v)| format!("{}={:?}", k, v)).collect(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            CommandSource::Query(q) => write!(f, "{}", q)?,
            CommandSource::Function(n) => write!(f, "{}()", n)?,
        }

        if !self.params.is_empty() {
            write!(f, " [{}]", self.params.logged().iter().join(", "))?;
        }

        Ok(())
    }
}
