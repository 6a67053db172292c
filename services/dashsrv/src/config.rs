//! Service configuration
//!
//! Loaded in layers: built-in defaults, then `config/dashsrv.yaml` (or the
//! file passed with `--config`), then `DASHSRV_*` environment variables
//! (`DASHSRV_SERVICE__PORT=9000`).

use std::path::{Path, PathBuf};

use common::ConfigLoader;
use serde::{Deserialize, Serialize};

use crate::error::{DashSrvError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/dashsrv.yaml";
pub const ENV_PREFIX: &str = "DASHSRV_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub service: ServiceConfig,
    pub log: LogSettings,
    pub grid: GridConfig,
    pub alerts: AlertsConfig,
    pub summaries: SummariesConfig,
    pub health: HealthConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "dashsrv".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub dir: PathBuf,
    pub json: bool,
    pub file: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            json: false,
            file: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub backend: GridBackend,
    pub redis_url: String,
    pub key_prefix: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            backend: GridBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertMode {
    /// Apply alerts to machine status in-process
    #[default]
    Local,
    /// Publish alerts to an MQTT broker
    Mqtt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub mode: AlertMode,
    pub mqtt: MqttConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub qos: u8,
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1883,
            client_id: "dashsrv".to_string(),
            qos: 1,
            keep_alive_secs: 30,
        }
    }
}

/// How the "lines" and "machines" summaries are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Lines summary reads the runs map; machines summary is labelled "runs"
    #[default]
    Legacy,
    /// Lines summary reads the lines map; machines summary is labelled "machines"
    Corrected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummariesConfig {
    pub mode: SummaryMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Report 503 when the alert relay is disconnected
    pub check_broker: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Run a full reset before serving
    pub reset_on_start: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            reset_on_start: true,
        }
    }
}

impl DashConfig {
    /// Load from the default file location (optional) and the environment
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load with an explicit config file, which must then exist
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        let loader = ConfigLoader::<DashConfig>::new();
        let loader = match path {
            Some(path) => loader.with_required_file(path),
            None => loader.with_file(DEFAULT_CONFIG_PATH),
        };
        let config = loader.with_env_prefix(ENV_PREFIX).build()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.name.trim().is_empty() {
            return Err(DashSrvError::config("service.name must not be empty"));
        }
        if self.service.port == 0 {
            return Err(DashSrvError::config("service.port must not be 0"));
        }
        if self.alerts.mqtt.qos > 2 {
            return Err(DashSrvError::config(format!(
                "alerts.mqtt.qos must be 0, 1 or 2 (got {})",
                self.alerts.mqtt.qos
            )));
        }
        if self.grid.backend == GridBackend::Redis && self.grid.redis_url.trim().is_empty() {
            return Err(DashSrvError::config(
                "grid.redis_url is required for the redis backend",
            ));
        }
        Ok(())
    }

    /// One-shot seeding only makes sense against a grid that outlives the process
    pub fn ensure_shared_grid(&self) -> Result<()> {
        if self.grid.backend == GridBackend::Memory {
            return Err(DashSrvError::config(
                "reset-all needs grid.backend = redis; the memory grid is discarded on exit",
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }

    pub fn log_config(&self) -> common::logging::LogConfig {
        common::logging::LogConfig {
            service_name: self.service.name.clone(),
            level: self.log.level.clone(),
            log_dir: self.log.dir.clone(),
            json: self.log.json,
            file: self.log.file,
        }
    }
}
