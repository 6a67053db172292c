//! Consistency tests for grid implementations
//!
//! Ensures MemoryGrid and RedisGrid behave the same for the operations the
//! dashboard relies on. Redis tests are ignored by default and require a
//! running Redis instance.
//!
//! Run all tests (including Redis): `cargo test --package iot-grid --test consistency_tests -- --ignored`

// Allow unwrap() in tests for cleaner test code
#![allow(clippy::disallowed_methods)]

use chrono::Utc;
use iot_grid::helpers::GridSnapshot;
use iot_grid::{machine_key, DataGrid, MemoryGrid};
use iot_model::{CalEntry, Customer, FacilityRef, Machine, CAL_ENTRY_TYPE_RUN};

const REDIS_URL: &str = "redis://127.0.0.1:6379";

fn cal_entry(cid: &str, fid: &str) -> CalEntry {
    let now = Utc::now();
    CalEntry {
        cid: cid.to_string(),
        title: "240-DS(Duff Beer)".to_string(),
        start: now,
        end: now,
        color: "#9ecf99".to_string(),
        entry_type: CAL_ENTRY_TYPE_RUN.to_string(),
        details: r#"{"desc":"The Run"}"#.to_string(),
        facility: FacilityRef {
            fid: fid.to_string(),
            name: "Somewhere".to_string(),
        },
    }
}

/// Scan-and-filter delete, the way the reset path removes calendar entries
async fn exercise_filtered_delete(grid: &dyn DataGrid) {
    for (cid, fid) in [("c1", "facility-1"), ("c2", "facility-2"), ("c3", "facility-2")] {
        grid.calendar().put(cid, cal_entry(cid, fid)).await.unwrap();
    }

    let stale: Vec<String> = grid
        .calendar()
        .values()
        .await
        .unwrap()
        .into_iter()
        .filter(|c| c.belongs_to("facility-2"))
        .map(|c| c.cid)
        .collect();
    assert_eq!(stale.len(), 2);

    for cid in &stale {
        assert!(grid.calendar().remove(cid).await.unwrap());
    }

    let left = grid.calendar().keys().await.unwrap();
    assert_eq!(left, vec!["c1".to_string()]);
}

async fn exercise_customer_round_trip(grid: &dyn DataGrid) {
    grid.customers()
        .put("Soylent", Customer::new("Soylent", "password"))
        .await
        .unwrap();
    let back = grid.customers().get("Soylent").await.unwrap().unwrap();
    assert_eq!(back, Customer::new("Soylent", "password"));
    assert_eq!(grid.customers().len().await.unwrap(), 1);

    grid.clear_all().await.unwrap();
    assert!(grid.customers().is_empty().await.unwrap());
}

// ============================================================================
// Memory backend
// ============================================================================

#[tokio::test]
async fn test_memory_filtered_delete() {
    let grid = MemoryGrid::new();
    exercise_filtered_delete(&grid).await;
}

#[tokio::test]
async fn test_memory_customer_round_trip() {
    let grid = MemoryGrid::new();
    exercise_customer_round_trip(&grid).await;
}

#[tokio::test]
async fn test_snapshot_sorted_and_scoped() {
    let grid = MemoryGrid::new();
    for (cid, fid) in [("c2", "facility-1"), ("c1", "facility-1"), ("c3", "facility-10")] {
        grid.calendar().put(cid, cal_entry(cid, fid)).await.unwrap();
    }
    for fid in ["facility-1", "facility-10"] {
        let machine = Machine {
            mid: "machine-1".to_string(),
            name: "Ultra Fryer".to_string(),
            status: "ok".to_string(),
            description: "Fries".to_string(),
            machine_type: "fryer".to_string(),
            current_fid: fid.to_string(),
            current_lid: "line-1".to_string(),
            telemetry: vec![],
        };
        let key = machine_key(fid, "line-1", "machine-1");
        grid.machines().put(&key, machine).await.unwrap();
    }
    grid.customers()
        .put("Soylent", Customer::new("Soylent", "password"))
        .await
        .unwrap();

    let snapshot = GridSnapshot::capture(&grid).await.unwrap();
    let cids: Vec<&str> = snapshot.calendar.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(cids, ["c1", "c2", "c3"]);
    assert_eq!(snapshot, GridSnapshot::capture(&grid).await.unwrap());

    let owned = snapshot.owned_by("facility-1");
    assert!(owned.customers.is_empty());
    assert_eq!(owned.calendar.len(), 2);
    assert_eq!(owned.machines.len(), 1);
    assert_eq!(owned.machines[0].0, "facility-1/line-1/machine-1");

    grid.machines()
        .remove("facility-10/line-1/machine-1")
        .await
        .unwrap();
    let after = GridSnapshot::capture(&grid).await.unwrap();
    assert_ne!(after, snapshot);
    assert_eq!(after.owned_by("facility-1"), owned);
}

// ============================================================================
// Redis backend
// ============================================================================

#[cfg(feature = "redis-backend")]
async fn redis_grid() -> iot_grid::RedisGrid {
    let run_id = uuid::Uuid::new_v4().to_string();
    iot_grid::RedisGrid::new(REDIS_URL, iot_grid::GridKeySpace::test(&run_id))
        .await
        .unwrap()
}

#[cfg(feature = "redis-backend")]
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_filtered_delete() {
    let grid = redis_grid().await;
    grid.ping().await.unwrap();
    exercise_filtered_delete(&grid).await;
    grid.clear_all().await.unwrap();
}

#[cfg(feature = "redis-backend")]
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_customer_round_trip() {
    let grid = redis_grid().await;
    exercise_customer_round_trip(&grid).await;
}
