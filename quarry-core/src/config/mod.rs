use serde::{Deserialize, Serialize};

mod database;
pub use database::*;
mod finder;
pub use finder::*;

/// An entire configuration for a quarry application
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct QuarryConfig {
    /// The human-readable name of the application
    #[serde(default)]
    pub name: String,
    /// Connection options for the backing database
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Finder compilation options
    #[serde(default)]
    pub finder: FinderConfig,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_quarry_config_parse() {
        let conf: QuarryConfig = serde_yaml::from_str(
            r#"
name: app
database:
  uri: "memory:app"
  user: admin
  password: secret
finder:
  default_connection: object
"#,
        )
        .unwrap();

        assert_eq!(conf.name, "app");
        assert_eq!(conf.database.uri, "memory:app");
        assert_eq!(conf.database.user, Some("admin".into()));
        assert_eq!(conf.finder.default_connection, ConnectionCategory::Object);
    }

    #[test]
    fn test_quarry_config_defaults() {
        let conf: QuarryConfig = serde_yaml::from_str("name: app").unwrap();

        assert_eq!(conf.finder.default_connection, ConnectionCategory::Document);
        assert_eq!(conf.database, DatabaseConfig::default());
    }
}
