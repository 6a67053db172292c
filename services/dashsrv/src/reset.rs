//! Full and per-facility reset of the demo data

use std::sync::Arc;

use iot_grid::{line_key, machine_key, DataGrid};
use iot_model::Customer;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::demo_data::{DemoTables, DEMO_PASSWORD};
use crate::error::Result;
use crate::generator::{generate_facility, FacilityGraph};
use crate::store_guard::StoreGuard;

/// Counts of entities written by a reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetReport {
    pub customers: usize,
    pub facilities: usize,
    pub lines: usize,
    pub machines: usize,
    pub runs: usize,
    pub calendar_entries: usize,
}

impl ResetReport {
    fn add_graph(&mut self, graph: &FacilityGraph) {
        self.facilities += 1;
        self.lines += graph.line_count();
        self.machines += graph.machine_count();
        self.runs += graph.runs.len();
        self.calendar_entries += graph.calendar.len();
    }
}

/// Counts of entities deleted by a scoped reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Removed {
    lines: usize,
    machines: usize,
    runs: usize,
    calendar_entries: usize,
}

pub struct ResetOrchestrator {
    grid: Arc<dyn DataGrid>,
    guard: Arc<StoreGuard>,
    tables: DemoTables,
}

impl ResetOrchestrator {
    pub fn new(grid: Arc<dyn DataGrid>, guard: Arc<StoreGuard>, tables: DemoTables) -> Self {
        Self {
            grid,
            guard,
            tables,
        }
    }

    /// Clear every map, reseed customers, then regenerate every facility
    pub async fn reset_all(&self) -> Result<ResetReport> {
        let _guard = self.guard.write().await;
        let grid = self.grid.as_ref();

        grid.clear_all().await?;

        let mut report = ResetReport::default();
        for company in self.tables.companies {
            grid.customers()
                .put(company, Customer::new(*company, DEMO_PASSWORD))
                .await?;
            report.customers += 1;
        }

        for template in self.tables.facilities {
            let graph = generate_facility(grid, template, &self.tables).await?;
            report.add_graph(&graph);
        }

        info!(
            backend = grid.backend_name(),
            customers = report.customers,
            facilities = report.facilities,
            machines = report.machines,
            "Full reset complete"
        );
        Ok(report)
    }

    /// Remove one facility with everything it owns, then regenerate it
    ///
    /// Returns `None` without touching the grid when `fid` is not stored.
    /// A stored facility without a matching template is removed and not
    /// regenerated.
    pub async fn reset_facility(&self, fid: &str) -> Result<Option<ResetReport>> {
        let _guard = self.guard.write().await;
        let grid = self.grid.as_ref();

        let Some(facility) = grid.facilities().get(fid).await? else {
            debug!(fid, "Reset skipped, facility not found");
            return Ok(None);
        };

        grid.facilities().remove(fid).await?;

        let mut removed = Removed::default();
        for line in &facility.lines {
            if grid.lines().remove(&line_key(fid, &line.lid)).await? {
                removed.lines += 1;
            }
            for machine in &line.machines {
                if grid
                    .machines()
                    .remove(&machine_key(fid, &line.lid, &machine.mid))
                    .await?
                {
                    removed.machines += 1;
                }
            }
            // Runs are not indexed by line; only the current run is known
            if grid.runs().remove(&line.current_run.rid).await? {
                removed.runs += 1;
            }
        }

        let stale: Vec<String> = grid
            .calendar()
            .values()
            .await?
            .into_iter()
            .filter(|entry| entry.belongs_to(fid))
            .map(|entry| entry.cid)
            .collect();
        for cid in &stale {
            if grid.calendar().remove(cid).await? {
                removed.calendar_entries += 1;
            }
        }

        debug!(
            fid,
            lines = removed.lines,
            machines = removed.machines,
            runs = removed.runs,
            calendar_entries = removed.calendar_entries,
            "Removed facility"
        );

        let mut report = ResetReport::default();
        match self.tables.facility_template(fid) {
            Some(template) => {
                let graph = generate_facility(grid, template, &self.tables).await?;
                report.add_graph(&graph);
                info!(fid, lines = report.lines, "Facility reset complete");
            },
            None => warn!(fid, "No template for facility, removed without regenerating"),
        }

        Ok(Some(report))
    }
}
