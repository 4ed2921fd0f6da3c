use serde::{Deserialize, Serialize};

/// Options used to open the backing database
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// The database uri, the scheme selects the storage, eg `memory:app`
    pub uri: String,
    /// The user to authenticate as
    pub user: Option<String>,
    /// The password of the user
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "memory:default".into(),
            user: None,
            password: None,
        }
    }
}

impl DatabaseConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }
}
