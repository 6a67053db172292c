//! In-process alert consumer

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use iot_grid::{machine_key, DataGrid};
use tracing::{debug, warn};

use super::{parse_alert_topic, AlertRelay, ControlMessage};
use crate::error::Result;
use crate::store_guard::StoreGuard;

/// Applies `warning`/`error` alerts to the addressed machine's status
pub struct LocalAlertRelay {
    grid: Arc<dyn DataGrid>,
    guard: Arc<StoreGuard>,
}

impl LocalAlertRelay {
    pub fn new(grid: Arc<dyn DataGrid>, guard: Arc<StoreGuard>) -> Self {
        Self { grid, guard }
    }
}

#[async_trait]
impl AlertRelay for LocalAlertRelay {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn relay(&self, topic: &str, payload: Bytes) -> Result<()> {
        let Some(address) = parse_alert_topic(topic) else {
            warn!(topic, "Ignoring alert on unrecognised topic");
            return Ok(());
        };

        let message: ControlMessage = serde_json::from_slice(&payload)?;
        let status = message.alert_type.to_ascii_lowercase();
        if status != "warning" && status != "error" {
            debug!(topic, alert_type = %message.alert_type, "Alert type does not change status");
            return Ok(());
        }

        let _guard = self.guard.write().await;
        let key = machine_key(&address.fid, &address.lid, &address.mid);
        let Some(mut machine) = self.grid.machines().get(&key).await? else {
            warn!(machine = %key, "Alert for unknown machine ignored");
            return Ok(());
        };

        machine.status = status;
        self.grid.machines().put(&key, machine).await?;
        debug!(machine = %key, "Machine status updated from alert");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::alerts::{alert_topic, forward_alert};
    use crate::demo_data::{DemoTables, FACILITIES};
    use crate::generator::generate_facility;
    use iot_grid::helpers::create_test_memory_grid;
    use iot_grid::MemoryGrid;
    use serde_json::Map;

    async fn relay_with_facility() -> (Arc<MemoryGrid>, LocalAlertRelay) {
        let grid = create_test_memory_grid();
        generate_facility(grid.as_ref(), &FACILITIES[0], &DemoTables::standard())
            .await
            .unwrap();
        let relay = LocalAlertRelay::new(grid.clone(), Arc::new(StoreGuard::new()));
        (grid, relay)
    }

    fn message(alert_type: &str) -> ControlMessage {
        ControlMessage {
            timestamp: 1_700_000_000_000,
            id: "alert-1".to_string(),
            alert_type: alert_type.to_string(),
            description: "simulated".to_string(),
            details: Map::new(),
        }
    }

    async fn machine_status(grid: &MemoryGrid, key: &str) -> String {
        grid.machines().get(key).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_warning_sets_machine_status() {
        let (grid, relay) = relay_with_facility().await;
        forward_alert(&relay, "facility-1", "line-2", "machine-3", &message("WARNING"))
            .await
            .unwrap();
        assert_eq!(
            machine_status(&grid, "facility-1/line-2/machine-3").await,
            "warning"
        );
        assert_eq!(machine_status(&grid, "facility-1/line-2/machine-4").await, "ok");
    }

    #[tokio::test]
    async fn test_other_types_leave_status() {
        let (grid, relay) = relay_with_facility().await;
        forward_alert(&relay, "facility-1", "line-1", "machine-1", &message("info"))
            .await
            .unwrap();
        assert_eq!(machine_status(&grid, "facility-1/line-1/machine-1").await, "ok");
    }

    #[tokio::test]
    async fn test_unknown_machine_and_topic_are_ignored() {
        let (grid, relay) = relay_with_facility().await;
        let before = grid.stats();

        forward_alert(&relay, "facility-9", "line-1", "machine-1", &message("error"))
            .await
            .unwrap();
        relay
            .relay("some/other/topic", message("error").to_payload().unwrap())
            .await
            .unwrap();

        assert_eq!(grid.stats(), before);
        assert!(!grid.machines().contains("facility-9/line-1/machine-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_garbage_payload_is_an_error() {
        let (_grid, relay) = relay_with_facility().await;
        let topic = alert_topic("facility-1", "line-1", "machine-1");
        assert!(relay.relay(&topic, Bytes::from_static(b"{oops")).await.is_err());
        assert!(relay.is_connected());
    }
}
