//! Redis implementation of the data grid
//!
//! Each entity map is one Redis hash: field = entity key, value = the
//! entity serialised as JSON. Several dashboard processes can share a grid
//! this way.

use crate::error::Result;
use crate::keyspace::GridKeySpace;
use crate::traits::*;
use async_trait::async_trait;
use iot_model::{CalEntry, Customer, Facility, Line, Machine, Run};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::debug;

/// One entity map stored in a Redis hash
pub struct RedisMap<T> {
    conn: ConnectionManager,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RedisMap<T> {
    pub fn new(conn: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
            _marker: PhantomData,
        }
    }
}

fn decode<T: Entity>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

#[async_trait]
impl<T: Entity> EntityMap<T> for RedisMap<T> {
    async fn get(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.hget(&self.key, key).await?;
        raw.as_deref().map(decode::<T>).transpose()
    }

    async fn put(&self, key: &str, value: T) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(&value)?;
        let _: () = conn.hset(&self.key, key, json).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.hdel(&self.key, key).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(&self.key).await?;
        debug!(hash = %self.key, "Cleared grid map");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let mut conn = self.conn.clone();
        let len: usize = conn.hlen(&self.key).await?;
        Ok(len)
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.hexists(&self.key, key).await?;
        Ok(exists)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.hkeys(&self.key).await?;
        Ok(keys)
    }

    async fn values(&self) -> Result<Vec<T>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.hvals(&self.key).await?;
        raw.iter().map(|s| decode(s)).collect()
    }

    async fn entries(&self) -> Result<Vec<(String, T)>> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(&self.key).await?;
        raw.into_iter()
            .map(|(k, v)| decode(&v).map(|value| (k, value)))
            .collect()
    }
}

/// Redis-backed grid
pub struct RedisGrid {
    conn: ConnectionManager,
    customers: RedisMap<Customer>,
    facilities: RedisMap<Facility>,
    lines: RedisMap<Line>,
    machines: RedisMap<Machine>,
    runs: RedisMap<Run>,
    calendar: RedisMap<CalEntry>,
}

impl RedisGrid {
    /// Connect to Redis and build the six maps under `keyspace`
    pub async fn new(url: &str, keyspace: GridKeySpace) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::from_connection(conn, keyspace))
    }

    /// Create from an existing connection manager
    pub fn from_connection(conn: ConnectionManager, keyspace: GridKeySpace) -> Self {
        Self {
            customers: RedisMap::new(conn.clone(), keyspace.customers()),
            facilities: RedisMap::new(conn.clone(), keyspace.facilities()),
            lines: RedisMap::new(conn.clone(), keyspace.lines()),
            machines: RedisMap::new(conn.clone(), keyspace.machines()),
            runs: RedisMap::new(conn.clone(), keyspace.runs()),
            calendar: RedisMap::new(conn.clone(), keyspace.calendar()),
            conn,
        }
    }
}

#[async_trait]
impl DataGrid for RedisGrid {
    fn backend_name(&self) -> &'static str {
        "redis"
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

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
