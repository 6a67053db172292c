//! Demo data generation
//!
//! [`build_facility`] produces the complete object graph for one facility
//! template without touching the grid; [`store_facility`] writes it.
//! Randomness and the clock are injected so tests can pin both.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use iot_grid::{line_key, machine_key, DataGrid};
use iot_model::{
    CalEntry, Customer, Facility, LatLng, Line, Machine, Run, Telemetry, CAL_ENTRY_TYPE_RUN,
    STATUS_OK,
};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::demo_data::{
    DemoTables, FacilityTemplate, LineTemplate, DEMO_PASSWORD, FACILITY_LAT, FACILITY_LNG,
    LINE_DESCRIPTION, MACHINE_DESCRIPTION, MS_IN_HOUR, RUN_DESCRIPTION, RUN_DETAILS_DESC,
};
use crate::error::Result;

/// Everything generated for one facility
///
/// Lines and machines live inside `facility`; runs and calendar entries are
/// kept alongside because they are stored in their own flat maps.
#[derive(Debug, Clone)]
pub struct FacilityGraph {
    pub facility: Facility,
    pub runs: Vec<Run>,
    pub calendar: Vec<CalEntry>,
}

impl FacilityGraph {
    pub fn line_count(&self) -> usize {
        self.facility.lines.len()
    }

    pub fn machine_count(&self) -> usize {
        self.facility.lines.iter().map(|l| l.machines.len()).sum()
    }
}

/// Build a facility, its lines, machines, runs and calendar entries
///
/// `customers` maps company name to the stored customer; a run whose
/// company is missing gets a customer built from the company name.
pub fn build_facility<R: Rng + ?Sized>(
    template: &FacilityTemplate,
    tables: &DemoTables,
    customers: &HashMap<String, Customer>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> FacilityGraph {
    let mut facility = Facility {
        fid: template.fid.to_string(),
        name: template.name.to_string(),
        address: template.name.to_string(),
        capacity: (rng.gen::<f64>() * 10000.0).round() as i64,
        utilization: 0.90 + 0.1 * rng.gen::<f64>(),
        location: LatLng::new(FACILITY_LAT, FACILITY_LNG),
        lines: Vec::with_capacity(tables.lines.len()),
    };
    let facility_ref = facility.to_ref();

    let mut runs = Vec::with_capacity(tables.lines.len());
    let mut calendar = Vec::with_capacity(tables.lines.len());

    for line_template in tables.lines {
        let run = build_run(tables, customers, rng, now);

        calendar.push(CalEntry {
            cid: uuid::Uuid::new_v4().to_string(),
            title: format!("{}({})", run.name, run.customer.name),
            start: run.start,
            end: run.end,
            color: line_template.color.to_string(),
            entry_type: CAL_ENTRY_TYPE_RUN.to_string(),
            details: serde_json::json!({ "desc": RUN_DETAILS_DESC }).to_string(),
            facility: facility_ref.clone(),
        });

        facility
            .lines
            .push(build_line(&facility.fid, line_template, tables, run.clone()));
        runs.push(run);
    }

    FacilityGraph {
        facility,
        runs,
        calendar,
    }
}

fn build_line(fid: &str, template: &LineTemplate, tables: &DemoTables, run: Run) -> Line {
    let machines = tables
        .machines
        .iter()
        .map(|m| Machine {
            mid: m.mid.to_string(),
            name: m.name.to_string(),
            status: STATUS_OK.to_string(),
            description: MACHINE_DESCRIPTION.to_string(),
            machine_type: m.machine_type.to_string(),
            current_fid: fid.to_string(),
            current_lid: template.lid.to_string(),
            telemetry: tables
                .telemetry
                .iter()
                .map(|t| Telemetry {
                    unit: t.unit.to_string(),
                    max: t.max,
                    min: t.min,
                    label: t.label.to_string(),
                    short_code: t.short_code.to_string(),
                })
                .collect(),
        })
        .collect();

    Line {
        lid: template.lid.to_string(),
        name: template.name.to_string(),
        description: LINE_DESCRIPTION.to_string(),
        status: STATUS_OK.to_string(),
        current_fid: fid.to_string(),
        current_run: run,
        machines,
    }
}

fn build_run<R: Rng + ?Sized>(
    tables: &DemoTables,
    customers: &HashMap<String, Customer>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Run {
    let name = tables.run_names.choose(rng).copied().unwrap_or_default();
    let company = tables.companies.choose(rng).copied().unwrap_or_default();

    let customer = match customers.get(company) {
        Some(customer) => customer.clone(),
        None => {
            warn!(company, "Customer not seeded, embedding placeholder");
            Customer::new(company, DEMO_PASSWORD)
        },
    };

    // Two independent draws: start up to 2h back, end up to 4h ahead
    let back_ms = (rng.gen::<f64>() * 2.0 * MS_IN_HOUR as f64).floor() as i64;
    let ahead_ms = (rng.gen::<f64>() * 4.0 * MS_IN_HOUR as f64).floor() as i64;

    Run {
        rid: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: RUN_DESCRIPTION.to_string(),
        status: STATUS_OK.to_string(),
        start: now - Duration::milliseconds(back_ms),
        end: now + Duration::milliseconds(ahead_ms),
        customer,
    }
}

/// Write a built facility graph into the grid
///
/// Children are written before the facility itself.
pub async fn store_facility(grid: &dyn DataGrid, graph: &FacilityGraph) -> Result<()> {
    let fid = &graph.facility.fid;

    for line in &graph.facility.lines {
        for machine in &line.machines {
            grid.machines()
                .put(&machine_key(fid, &line.lid, &machine.mid), machine.clone())
                .await?;
        }
        grid.lines()
            .put(&line_key(fid, &line.lid), line.clone())
            .await?;
    }

    for run in &graph.runs {
        grid.runs().put(&run.rid, run.clone()).await?;
    }

    for entry in &graph.calendar {
        grid.calendar().put(&entry.cid, entry.clone()).await?;
    }

    grid.facilities()
        .put(fid, graph.facility.clone())
        .await?;

    debug!(
        fid = %fid,
        lines = graph.line_count(),
        machines = graph.machine_count(),
        runs = graph.runs.len(),
        "Stored facility"
    );
    Ok(())
}

/// Build one facility against the current customers and store it
pub async fn generate_facility(
    grid: &dyn DataGrid,
    template: &FacilityTemplate,
    tables: &DemoTables,
) -> Result<FacilityGraph> {
    let customers: HashMap<String, Customer> =
        grid.customers().entries().await?.into_iter().collect();

    let graph = {
        let mut rng = rand::thread_rng();
        build_facility(template, tables, &customers, &mut rng, Utc::now())
    };

    store_facility(grid, &graph).await?;
    Ok(graph)
}
