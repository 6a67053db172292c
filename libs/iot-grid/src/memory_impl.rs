//! In-memory grid implementation
//!
//! Uses DashMap for lock-free concurrent access. This is the default
//! backend and the fake used by service tests.

use crate::error::Result;
use crate::traits::*;
use async_trait::async_trait;
use dashmap::DashMap;
use iot_model::{CalEntry, Customer, Facility, Line, Machine, Run};

/// One entity map held in process memory
pub struct MemoryMap<T> {
    inner: DashMap<String, T>,
}

impl<T> MemoryMap<T> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Synchronous size, for stats
    pub fn size(&self) -> usize {
        self.inner.len()
    }
}

impl<T> Default for MemoryMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityMap<T> for MemoryMap<T> {
    async fn get(&self, key: &str) -> Result<Option<T>> {
        Ok(self.inner.get(key).map(|v| v.clone()))
    }

    async fn put(&self, key: &str, value: T) -> Result<()> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.inner.remove(key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.inner.len())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.inner.contains_key(key))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.inner.iter().map(|e| e.key().clone()).collect())
    }

    async fn values(&self) -> Result<Vec<T>> {
        Ok(self.inner.iter().map(|e| e.value().clone()).collect())
    }

    async fn entries(&self) -> Result<Vec<(String, T)>> {
        Ok(self
            .inner
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect())
    }
}

/// In-memory grid with concurrent access support
#[derive(Default)]
pub struct MemoryGrid {
    customers: MemoryMap<Customer>,
    facilities: MemoryMap<Facility>,
    lines: MemoryMap<Line>,
    machines: MemoryMap<Machine>,
    runs: MemoryMap<Run>,
    calendar: MemoryMap<CalEntry>,
}

impl MemoryGrid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Get statistics about stored data
    pub fn stats(&self) -> GridStats {
        GridStats {
            customers: self.customers.size(),
            facilities: self.facilities.size(),
            lines: self.lines.size(),
            machines: self.machines.size(),
            runs: self.runs.size(),
            calendar: self.calendar.size(),
        }
    }
}

/// Per-map entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub customers: usize,
    pub facilities: usize,
    pub lines: usize,
    pub machines: usize,
    pub runs: usize,
    pub calendar: usize,
}

#[async_trait]
impl DataGrid for MemoryGrid {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn customers(&self) -> &dyn EntityMap<Customer> {
        &self.customers
    }

    fn facilities(&self) -> &dyn EntityMap<Facility> {
        &self.facilities
    }

    fn lines(&self) -> &dyn EntityMap<Line> {
        &self.lines
    }

    fn machines(&self) -> &dyn EntityMap<Machine> {
        &self.machines
    }

    fn runs(&self) -> &dyn EntityMap<Run> {
        &self.runs
    }

    fn calendar(&self) -> &dyn EntityMap<CalEntry> {
        &self.calendar
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_map_operations() {
        let map: MemoryMap<Customer> = MemoryMap::new();

        map.put("Hooli", Customer::new("Hooli", "password"))
            .await
            .unwrap();
        assert_eq!(map.len().await.unwrap(), 1);
        assert!(map.contains("Hooli").await.unwrap());
        assert_eq!(
            map.get("Hooli").await.unwrap().map(|c| c.name),
            Some("Hooli".to_string())
        );

        // Put replaces
        map.put("Hooli", Customer::new("Hooli", "changed"))
            .await
            .unwrap();
        assert_eq!(map.len().await.unwrap(), 1);
        assert_eq!(map.get("Hooli").await.unwrap().unwrap().password, "changed");

        assert!(map.remove("Hooli").await.unwrap());
        assert!(!map.remove("Hooli").await.unwrap());
        assert!(map.is_empty().await.unwrap());
        assert_eq!(map.get("Hooli").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_grid_clear_all() {
        let grid = MemoryGrid::new();
        grid.customers()
            .put("Acme Corp", Customer::new("Acme Corp", "password"))
            .await
            .unwrap();
        assert_eq!(grid.stats().customers, 1);

        grid.clear_all().await.unwrap();
        assert_eq!(grid.stats(), GridStats::default());
        assert_eq!(grid.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_entries_and_keys_agree() {
        let map: MemoryMap<Customer> = MemoryMap::new();
        for name in ["a", "b", "c"] {
            map.put(name, Customer::new(name, "password")).await.unwrap();
        }

        let mut keys = map.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let entries = map.entries().await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|(k, v)| *k == v.name));
        assert_eq!(map.values().await.unwrap().len(), 3);
    }
}
