//! IoT Dashboard Data Grid Abstraction
//!
//! Provides the single source of truth for dashboard entities: one keyed
//! map per entity type, behind a trait so the reset and summary logic can
//! run against an in-memory fake or a shared Redis instance.
//!
//! # Key Components
//!
//! - **EntityMap trait**: keyed map of one entity type
//! - **DataGrid trait**: the six typed maps (customers, facilities, lines,
//!   machines, runs, calendar)
//! - **MemoryGrid**: DashMap-backed grid, default backend and test fake
//! - **RedisGrid**: one Redis hash per entity type (feature `redis-backend`)

pub mod error;

pub mod keyspace;

pub mod traits;

pub mod memory_impl;

#[cfg(feature = "redis-backend")]
pub mod redis_impl;

// Re-exports
pub use error::{GridError, Result};
pub use keyspace::{line_key, machine_key, GridKeySpace};
pub use memory_impl::{GridStats, MemoryGrid, MemoryMap};
pub use traits::{DataGrid, Entity, EntityMap};

#[cfg(feature = "redis-backend")]
pub use redis_impl::{RedisGrid, RedisMap};

/// Helper functions for tests and tooling
pub mod helpers {
    use super::{DataGrid, Entity, EntityMap, MemoryGrid, Result};
    use iot_model::{CalEntry, Customer, Facility, Line, Machine, Run};
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Create an in-memory grid for unit testing
    ///
    /// # Example
    /// ```
    /// use iot_grid::helpers::create_test_grid;
    ///
    /// let grid = create_test_grid();
    /// // Use grid in tests...
    /// ```
    pub fn create_test_grid() -> Arc<dyn DataGrid> {
        Arc::new(MemoryGrid::new())
    }

    /// Create a concrete MemoryGrid when tests need `stats()` or `clear_all()`
    pub fn create_test_memory_grid() -> Arc<MemoryGrid> {
        Arc::new(MemoryGrid::new())
    }

    /// Full contents of all six maps, each sorted by key
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct GridSnapshot {
        pub customers: Vec<(String, Customer)>,
        pub facilities: Vec<(String, Facility)>,
        pub lines: Vec<(String, Line)>,
        pub machines: Vec<(String, Machine)>,
        pub runs: Vec<(String, Run)>,
        pub calendar: Vec<(String, CalEntry)>,
    }

    async fn sorted_entries<T: Entity>(map: &dyn EntityMap<T>) -> Result<Vec<(String, T)>> {
        let mut entries = map.entries().await?;
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    impl GridSnapshot {
        pub async fn capture(grid: &dyn DataGrid) -> Result<Self> {
            Ok(Self {
                customers: sorted_entries(grid.customers()).await?,
                facilities: sorted_entries(grid.facilities()).await?,
                lines: sorted_entries(grid.lines()).await?,
                machines: sorted_entries(grid.machines()).await?,
                runs: sorted_entries(grid.runs()).await?,
                calendar: sorted_entries(grid.calendar()).await?,
            })
        }

        /// Entries owned by one facility: its record, lines and machines
        /// under `fid/`, the current runs of its lines and its calendar
        /// entries. Customers are shared and left out.
        pub fn owned_by(&self, fid: &str) -> Self {
            let prefix = format!("{fid}/");
            let rids: HashSet<&str> = self
                .facilities
                .iter()
                .filter(|(key, _)| key == fid)
                .flat_map(|(_, facility)| &facility.lines)
                .map(|line| line.current_run.rid.as_str())
                .collect();

            Self {
                customers: Vec::new(),
                facilities: self
                    .facilities
                    .iter()
                    .filter(|(key, _)| key == fid)
                    .cloned()
                    .collect(),
                lines: self
                    .lines
                    .iter()
                    .filter(|(key, _)| key.starts_with(&prefix))
                    .cloned()
                    .collect(),
                machines: self
                    .machines
                    .iter()
                    .filter(|(key, _)| key.starts_with(&prefix))
                    .cloned()
                    .collect(),
                runs: self
                    .runs
                    .iter()
                    .filter(|(key, _)| rids.contains(key.as_str()))
                    .cloned()
                    .collect(),
                calendar: self
                    .calendar
                    .iter()
                    .filter(|(_, entry)| entry.facility.fid == fid)
                    .cloned()
                    .collect(),
            }
        }
    }
}
