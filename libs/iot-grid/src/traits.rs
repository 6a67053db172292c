//! Trait definitions for the data grid abstraction

use crate::error::Result;
use async_trait::async_trait;
use iot_model::{CalEntry, Customer, Facility, Line, Machine, Run};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Anything that can live in a grid map
///
/// Values are stored as JSON by remote backends, so every entity must
/// round-trip through serde.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Entity for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// A keyed map of one entity type
///
/// Ordering of `keys`/`values`/`entries` is unspecified. There is no
/// filtered bulk delete: callers scan and `remove` explicitly.
#[async_trait]
pub trait EntityMap<T: Entity>: Send + Sync {
    /// Get value by key
    async fn get(&self, key: &str) -> Result<Option<T>>;

    /// Insert or replace value for key
    async fn put(&self, key: &str, value: T) -> Result<()>;

    /// Remove key, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Remove every entry
    async fn clear(&self) -> Result<()>;

    /// Number of entries
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if key exists
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// All keys
    async fn keys(&self) -> Result<Vec<String>>;

    /// All values
    async fn values(&self) -> Result<Vec<T>>;

    /// All key/value pairs
    async fn entries(&self) -> Result<Vec<(String, T)>>;
}

/// The six entity maps backing the dashboard
///
/// Implementations:
/// - `MemoryGrid`: DashMap-backed, for single-process use and tests
/// - `RedisGrid`: shared Redis hashes
#[async_trait]
pub trait DataGrid: Send + Sync + 'static {
    /// Short backend label for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Customers keyed by name
    fn customers(&self) -> &dyn EntityMap<Customer>;

    /// Facilities keyed by fid
    fn facilities(&self) -> &dyn EntityMap<Facility>;

    /// Lines keyed by `fid/lid`
    fn lines(&self) -> &dyn EntityMap<Line>;

    /// Machines keyed by `fid/lid/mid`
    fn machines(&self) -> &dyn EntityMap<Machine>;

    /// Runs keyed by rid
    fn runs(&self) -> &dyn EntityMap<Run>;

    /// Calendar entries keyed by cid
    fn calendar(&self) -> &dyn EntityMap<CalEntry>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Clear all six maps
    ///
    /// Maps are cleared one after another; this is not atomic.
    async fn clear_all(&self) -> Result<()> {
        self.facilities().clear().await?;
        self.lines().clear().await?;
        self.customers().clear().await?;
        self.machines().clear().await?;
        self.runs().clear().await?;
        self.calendar().clear().await?;
        Ok(())
    }
}
