//! Shared application state

use std::sync::Arc;

use iot_grid::{DataGrid, MemoryGrid};
use tracing::info;

use crate::alerts::{AlertRelay, LocalAlertRelay, MqttAlertRelay};
use crate::config::{AlertMode, DashConfig, GridBackend};
use crate::demo_data::DemoTables;
use crate::error::Result;
use crate::reset::ResetOrchestrator;
use crate::store_guard::StoreGuard;
use crate::summary::SummaryAggregator;

pub struct AppState {
    pub config: Arc<DashConfig>,
    pub grid: Arc<dyn DataGrid>,
    pub reset: ResetOrchestrator,
    pub summaries: SummaryAggregator,
    pub relay: Arc<dyn AlertRelay>,
}

impl AppState {
    /// Wire state over an existing grid, choosing the relay from config
    pub fn new(config: DashConfig, grid: Arc<dyn DataGrid>) -> Self {
        let guard = Arc::new(StoreGuard::new());
        let relay: Arc<dyn AlertRelay> = match config.alerts.mode {
            AlertMode::Local => Arc::new(LocalAlertRelay::new(grid.clone(), guard.clone())),
            AlertMode::Mqtt => Arc::new(MqttAlertRelay::start(&config.alerts.mqtt)),
        };
        Self::with_relay(config, grid, guard, relay)
    }

    pub fn with_relay(
        config: DashConfig,
        grid: Arc<dyn DataGrid>,
        guard: Arc<StoreGuard>,
        relay: Arc<dyn AlertRelay>,
    ) -> Self {
        let reset = ResetOrchestrator::new(grid.clone(), guard.clone(), DemoTables::standard());
        let summaries = SummaryAggregator::new(grid.clone(), guard, config.summaries.mode);
        Self {
            config: Arc::new(config),
            grid,
            reset,
            summaries,
            relay,
        }
    }

    /// Build state with the grid backend selected in config
    pub async fn from_config(config: DashConfig) -> Result<Self> {
        let grid = connect_grid(&config).await?;
        Ok(Self::new(config, grid))
    }
}

/// Open the configured grid backend
pub async fn connect_grid(config: &DashConfig) -> Result<Arc<dyn DataGrid>> {
    let grid: Arc<dyn DataGrid> = match config.grid.backend {
        GridBackend::Memory => Arc::new(MemoryGrid::new()),
        #[cfg(feature = "redis-backend")]
        GridBackend::Redis => {
            let keyspace = iot_grid::GridKeySpace::new(config.grid.key_prefix.clone());
            let grid = iot_grid::RedisGrid::new(&config.grid.redis_url, keyspace).await?;
            grid.ping().await?;
            Arc::new(grid)
        },
        #[cfg(not(feature = "redis-backend"))]
        GridBackend::Redis => {
            return Err(crate::error::DashSrvError::config(
                "redis backend not compiled in (enable feature `redis-backend`)",
            ))
        },
    };
    info!(backend = grid.backend_name(), "Data grid ready");
    Ok(grid)
}
