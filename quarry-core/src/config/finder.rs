use std::{fmt, str::FromStr};

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Options for compiling and executing finder methods
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct FinderConfig {
    /// The connection used by methods whose result type is not
    /// recognised by any executor and which declare no connection hint
    #[serde(default)]
    pub default_connection: ConnectionCategory,
}

/// The kind of connection a query is executed through
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionCategory {
    /// Raw documents, the generic connection which can run any query
    #[default]
    Document,
    /// Mapped entity objects
    Object,
    /// Vertices and edges
    Graph,
}

impl ConnectionCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionCategory::Document => "document",
            ConnectionCategory::Object => "object",
            ConnectionCategory::Graph => "graph",
        }
    }

    /// The generic category may be replaced by a more specific one
    /// requested explicitly on a method
    pub fn is_generic(&self) -> bool {
        *self == ConnectionCategory::Document
    }
}

impl fmt::Display for ConnectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConnectionCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "document" => ConnectionCategory::Document,
            "object" => ConnectionCategory::Object,
            "graph" => ConnectionCategory::Graph,
            s => bail!("Unknown connection category {}", s),
        })
    }
}
