//! Rollup statistics for the dashboard UI

use std::sync::Arc;

use iot_grid::DataGrid;
use iot_model::{Severity, Summary};
use tracing::debug;

pub use crate::config::SummaryMode;
use crate::error::Result;
use crate::store_guard::StoreGuard;

/// Stub with no backing entity
pub fn operators_summary() -> Summary {
    Summary::new("operators", "Operators", 23).with_counts(4, 1)
}

pub struct SummaryAggregator {
    grid: Arc<dyn DataGrid>,
    guard: Arc<StoreGuard>,
    mode: SummaryMode,
}

impl SummaryAggregator {
    pub fn new(grid: Arc<dyn DataGrid>, guard: Arc<StoreGuard>, mode: SummaryMode) -> Self {
        Self { grid, guard, mode }
    }

    /// Six summaries, always in the order
    /// clients, runs, lines, facilities, machines, operators
    pub async fn summaries(&self) -> Result<Vec<Summary>> {
        let _guard = self.guard.read().await;
        let grid = self.grid.as_ref();

        let clients = Summary::new("clients", "Clients", grid.customers().len().await? as u64);

        let run_severities: Vec<Severity> = grid
            .runs()
            .values()
            .await?
            .iter()
            .map(|r| Severity::from_status(&r.status))
            .collect();
        let runs = Summary::classify("runs", "Runs", run_severities.iter().copied());

        let lines = match self.mode {
            SummaryMode::Legacy => Summary::classify("lines", "Lines", run_severities),
            SummaryMode::Corrected => Summary::classify(
                "lines",
                "Lines",
                grid.lines()
                    .values()
                    .await?
                    .iter()
                    .map(|l| Severity::from_status(&l.status)),
            ),
        };

        let facilities = Summary::classify(
            "facilities",
            "Facilities",
            grid.facilities()
                .values()
                .await?
                .iter()
                .map(|f| Severity::from_utilization(f.utilization)),
        );

        let (machines_name, machines_title) = match self.mode {
            SummaryMode::Legacy => ("runs", "Runs"),
            SummaryMode::Corrected => ("machines", "Machines"),
        };
        let machines = Summary::classify(
            machines_name,
            machines_title,
            grid.machines()
                .values()
                .await?
                .iter()
                .map(|m| Severity::from_status(&m.status)),
        );

        debug!(
            mode = ?self.mode,
            facilities = facilities.count,
            machines = machines.count,
            "Computed summaries"
        );

        Ok(vec![
            clients,
            runs,
            lines,
            facilities,
            machines,
            operators_summary(),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::demo_data::DemoTables;
    use crate::reset::ResetOrchestrator;
    use iot_grid::helpers::create_test_memory_grid;
    use iot_grid::MemoryGrid;

    async fn seeded(mode: SummaryMode) -> (Arc<MemoryGrid>, SummaryAggregator) {
        let grid = create_test_memory_grid();
        let guard = Arc::new(StoreGuard::new());
        ResetOrchestrator::new(grid.clone(), guard.clone(), DemoTables::standard())
            .reset_all()
            .await
            .unwrap();
        let aggregator = SummaryAggregator::new(grid.clone(), guard, mode);
        (grid, aggregator)
    }

    async fn set_facility_utilization(grid: &MemoryGrid, fid: &str, utilization: f64) {
        let mut facility = grid.facilities().get(fid).await.unwrap().unwrap();
        facility.utilization = utilization;
        grid.facilities().put(fid, facility).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_grid() {
        let grid = create_test_memory_grid();
        let aggregator =
            SummaryAggregator::new(grid, Arc::new(StoreGuard::new()), SummaryMode::Legacy);
        let summaries = aggregator.summaries().await.unwrap();
        assert_eq!(summaries.len(), 6);
        assert!(summaries[..5].iter().all(|s| s.count == 0));
        assert_eq!(summaries[5], operators_summary());
    }

    #[tokio::test]
    async fn test_legacy_order_and_labels() {
        let (_grid, aggregator) = seeded(SummaryMode::Legacy).await;
        let summaries = aggregator.summaries().await.unwrap();

        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["clients", "runs", "lines", "facilities", "runs", "operators"]);

        assert_eq!(summaries[0].count, 17);
        assert_eq!(summaries[1].count, 32);
        // lines reads the runs map in legacy mode
        assert_eq!(summaries[2].count, 32);
        assert_eq!(summaries[3].count, 4);
        assert_eq!(summaries[4].count, 256);
        assert_eq!(summaries[4].title, "Runs");

        let operators = &summaries[5];
        assert_eq!(
            (operators.count, operators.warning_count, operators.error_count),
            (23, 4, 1)
        );
    }

    #[tokio::test]
    async fn test_corrected_mode_reads_lines() {
        let (grid, aggregator) = seeded(SummaryMode::Corrected).await;

        let mut line = grid.lines().get("facility-1/line-1").await.unwrap().unwrap();
        line.status = "ERROR".to_string();
        grid.lines().put("facility-1/line-1", line).await.unwrap();

        let summaries = aggregator.summaries().await.unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["clients", "runs", "lines", "facilities", "machines", "operators"]
        );
        assert_eq!(summaries[2].count, 32);
        assert_eq!(summaries[2].error_count, 1);
        assert_eq!(summaries[1].error_count, 0);
        assert_eq!(summaries[4].title, "Machines");
    }

    #[tokio::test]
    async fn test_facility_utilization_buckets() {
        let (grid, aggregator) = seeded(SummaryMode::Legacy).await;

        set_facility_utilization(&grid, "facility-1", 0.4).await;
        set_facility_utilization(&grid, "facility-2", 0.6).await;
        // boundary: exactly 0.5 is in neither bucket
        set_facility_utilization(&grid, "facility-3", 0.5).await;

        let facilities = &aggregator.summaries().await.unwrap()[3];
        assert_eq!(facilities.count, 4);
        assert_eq!(facilities.warning_count, 1);
        assert_eq!(facilities.error_count, 1);
        assert!(facilities.warning_count + facilities.error_count <= facilities.count);
    }

    #[tokio::test]
    async fn test_machine_status_case_insensitive() {
        let (grid, aggregator) = seeded(SummaryMode::Legacy).await;

        for (key, status) in [
            ("facility-1/line-1/machine-1", "Warning"),
            ("facility-1/line-1/machine-2", "warning"),
            ("facility-4/line-8/machine-8", "ERROR"),
        ] {
            let mut machine = grid.machines().get(key).await.unwrap().unwrap();
            machine.status = status.to_string();
            grid.machines().put(key, machine).await.unwrap();
        }

        let machines = &aggregator.summaries().await.unwrap()[4];
        assert_eq!(machines.warning_count, 2);
        assert_eq!(machines.error_count, 1);
    }
}
