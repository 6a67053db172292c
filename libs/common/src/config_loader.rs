//! Layered configuration loading
//!
//! Priority (lowest to highest):
//! 1. Default values (`T::default()`)
//! 2. Configuration file (yaml, toml or json, chosen by extension)
//! 3. Environment variables with a prefix, `__` separating nested keys
//!
//! ```ignore
//! let config: MyConfig = ConfigLoader::new()
//!     .with_file("config/dashsrv.yaml")
//!     .with_env_prefix("DASHSRV_")
//!     .build()?;
//! ```

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to load configuration: {0}")]
    Extract(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Generic configuration loader
pub struct ConfigLoader<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    file: Option<PathBuf>,
    /// Whether a missing file is an error (true for explicit `--config`)
    file_required: bool,
    env_prefix: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ConfigLoader<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    fn default() -> Self {
        Self {
            file: None,
            file_required: false,
            env_prefix: None,
            _marker: PhantomData,
        }
    }
}

impl<T> ConfigLoader<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an optional configuration file; skipped when absent
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self.file_required = false;
        self
    }

    /// Merge a configuration file that must exist
    pub fn with_required_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self.file_required = true;
        self
    }

    /// Merge environment variables starting with `prefix`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<T> {
        let mut figment = Figment::from(Serialized::defaults(T::default()));

        if let Some(path) = &self.file {
            if path.exists() {
                info!("Loading config file: {}", path.display());
                figment = merge_file(figment, path)?;
            } else if self.file_required {
                return Err(ConfigError::NotFound(path.display().to_string()));
            } else {
                debug!("Config file not found, skipping: {}", path.display());
            }
        }

        if let Some(prefix) = &self.env_prefix {
            debug!("Applying environment variables, prefix: {}", prefix);
            figment = figment.merge(Env::prefixed(prefix).split("__"));
        }

        Ok(figment.extract()?)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "toml" => Ok(figment.merge(Toml::file(path))),
        "json" => Ok(figment.merge(Json::file(path))),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        name: String,
        port: u16,
        nested: Nested,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Nested {
        enabled: bool,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                name: "svc".to_string(),
                port: 8080,
                nested: Nested { enabled: false },
            }
        }
    }

    #[test]
    fn test_defaults_only() {
        let config: TestConfig = ConfigLoader::new().build().unwrap();
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "port: 9090\nnested:\n  enabled: true").unwrap();

        let config: TestConfig = ConfigLoader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.port, 9090);
        assert!(config.nested.enabled);
        assert_eq!(config.name, "svc");
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("svc.toml", "port = 7000")?;
            jail.set_env("TESTSVC_PORT", "7100");
            jail.set_env("TESTSVC_NESTED__ENABLED", "true");

            let config: TestConfig = ConfigLoader::new()
                .with_file("svc.toml")
                .with_env_prefix("TESTSVC_")
                .build()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.port, 7100);
            assert!(config.nested.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_missing_required_file() {
        let result: Result<TestConfig> = ConfigLoader::new()
            .with_required_file("/nonexistent/dashsrv.yaml")
            .build();
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result: Result<TestConfig> = ConfigLoader::new().with_file(file.path()).build();
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
