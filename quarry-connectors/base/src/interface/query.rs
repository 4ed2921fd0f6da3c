use std::collections::HashMap;

use quarry_core::err::{Context, Result};
use serde::{Deserialize, Serialize};

use super::ResultSet;

/// A command bound to a connection, ready to be executed
pub trait QueryHandle {
    type TResultSet: ResultSet;

    /// Executes the command, returning the generated result set
    fn execute(&mut self) -> Result<Self::TResultSet>;

    /// Returns a loggable representation of the command
    fn logged(&self) -> Result<LoggedQuery>;
}

/// A string representation of a query, used mainly for logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedQuery {
    query: String,
    params: Vec<String>,
    other: HashMap<String, String>,
}

impl LoggedQuery {
    pub fn new(
        query: impl Into<String>,
        params: Vec<String>,
        other: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            query: query.into(),
            params,
            other: other.unwrap_or_default(),
        }
    }

    pub fn new_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: vec![],
            other: HashMap::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> &Vec<String> {
        &self.params
    }

    pub fn other(&self) -> &HashMap<String, String> {
        &self.other
    }

    pub fn other_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.other
    }

    /// Renders the query as a single json line
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialise logged query")
    }
}
