use std::{
    any::type_name,
    fs,
    path::{Path, PathBuf},
};

use quarry_core::{
    config::QuarryConfig,
    err::{Context, Result},
};
use quarry_logging::{debug, info};
use serde::Deserialize;
use serde_yaml::Deserializer;

use crate::{
    ctx::Ctx,
    processor::{
        dir::DirConfigProcessor,
        env::EnvConfigProcessor,
        util::{expression_to_string, parse_expression, process_expression, process_strings},
        ConfigExprProcessor,
    },
};

/// Parses and loads the configuration
pub struct ConfigLoader {
    processors: Vec<Box<dyn ConfigExprProcessor>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Initialises the configuration loader
    pub fn new() -> Self {
        Self {
            processors: vec![
                Box::new(EnvConfigProcessor::default()),
                Box::new(DirConfigProcessor::default()),
            ],
        }
    }

    /// Loads the application configuration from the supplied file
    pub fn load(&self, path: &Path) -> Result<QuarryConfig> {
        let path = path
            .canonicalize()
            .context("Failed to get full config path")?;
        info!("Loading config from path {}", path.display());

        let file_data = fs::read(&path)
            .with_context(|| format!("Failed to read config from file {}", path.display()))?;

        self.parse(file_data.as_slice(), Some(path))
    }

    /// Parses the supplied yaml into the application configuration
    pub fn parse(&self, data: &[u8], path: Option<PathBuf>) -> Result<QuarryConfig> {
        let processed = self.load_data(data, path)?;

        debug!("Parsing into {}", type_name::<QuarryConfig>());
        serde_yaml::from_value(processed).context("Failed to parse yaml into QuarryConfig")
    }

    /// Parses and processes the supplied yaml
    pub(crate) fn load_data(&self, data: &[u8], path: Option<PathBuf>) -> Result<serde_yaml::Value> {
        let config = serde_yaml::Value::deserialize(Deserializer::from_slice(data))
            .context("Failed to parse yaml")?;
        let ctx = Ctx::new(path);

        let config = process_strings(config, &|string| {
            let exp = parse_expression(string.as_str())?;

            let res = process_expression(exp, &|mut exp| {
                for processor in self.processors.iter() {
                    exp = processor.process(&ctx, exp).with_context(|| {
                        format!(
                            "Failed to process config value \"{}\" using the {} processor",
                            string,
                            processor.display_name()
                        )
                    })?;
                }

                Ok(exp)
            })?;

            Ok(expression_to_string(res))
        })?;

        debug!("Finished processing yaml");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, io::Write};

    use quarry_core::config::ConnectionCategory;

    use super::*;

    fn process_yaml(yaml: &str, path: Option<PathBuf>) -> Result<String> {
        let loader = ConfigLoader::new();

        let processed = loader.load_data(yaml.as_bytes(), path);

        processed
            .and_then(|val| Ok(serde_yaml::to_string(&val)?))
            // remove trailing new line
            .map(|s| s.trim_end_matches('\n').to_string())
    }

    #[test]
    fn test_config_loader_basic_yaml() {
        let result = process_yaml("a: b", None);

        assert_eq!(result.unwrap(), "a: b");
    }

    #[test]
    fn test_config_loader_unknown_interpolation() {
        let result = process_yaml(r#"a: ${unknown}"#, None);

        assert_eq!(result.unwrap(), r#"a: ${unknown}"#);
    }

    #[test]
    fn test_config_loader_env_interpolation() {
        env::set_var("QUARRY_CONFIG_LOADER_TEST1", "FROM_ENV_VAR");
        let result = process_yaml(r#"a: "${ENV:QUARRY_CONFIG_LOADER_TEST1}""#, None);

        assert_eq!(result.unwrap(), r#"a: FROM_ENV_VAR"#);
    }

    #[test]
    fn test_config_loader_nested_env_interpolation() {
        env::set_var(
            "QUARRY_CONFIG_LOADER_TEST2_INNER",
            "QUARRY_CONFIG_LOADER_TEST2_OUTER",
        );
        env::set_var("QUARRY_CONFIG_LOADER_TEST2_OUTER", "RESOLVED_OUTER_VALUE");
        let result = process_yaml(r#"a: "${env:${env:QUARRY_CONFIG_LOADER_TEST2_INNER}}""#, None);

        assert_eq!(result.unwrap(), r#"a: RESOLVED_OUTER_VALUE"#);
    }

    #[test]
    fn test_config_loader_missing_env_var() {
        let result = process_yaml(r#"a: "${ENV:QUARRY_CONFIG_LOADER_UNSET}""#, None);

        assert!(result.is_err());
    }

    #[test]
    fn test_config_loader_dir_interpolation() {
        let result = process_yaml(r#"a: "${dir}/bar/baz""#, Some("/foo/config.yml".into()));

        assert_eq!(result.unwrap(), r#"a: /foo/bar/baz"#);
    }

    #[test]
    fn test_config_loader_load_file() {
        env::set_var("QUARRY_CONFIG_LOADER_TEST3", "s3cret");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
name: app
database:
  uri: "memory:app"
  password: "${{ENV:QUARRY_CONFIG_LOADER_TEST3}}"
finder:
  default_connection: graph
"#
        )
        .unwrap();

        let conf = ConfigLoader::new().load(file.path()).unwrap();

        assert_eq!(conf.name, "app");
        assert_eq!(conf.database.uri, "memory:app");
        assert_eq!(conf.database.password, Some("s3cret".into()));
        assert_eq!(conf.finder.default_connection, ConnectionCategory::Graph);
    }

    #[test]
    fn test_config_loader_load_missing_file() {
        let res = ConfigLoader::new().load(Path::new("/definitely/not/here.yml"));

        assert!(res.is_err());
    }
}
