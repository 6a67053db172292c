//! Entity types stored in the data grid
//!
//! Facility -> Line -> Machine is a strict tree held by value. Runs and
//! calendar entries are also stored in their own flat maps, so the owning
//! facility keeps copies rather than references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status assigned to every freshly generated line, machine and run
pub const STATUS_OK: &str = "ok";

/// Calendar entry type used for entries mirroring a run
pub const CAL_ENTRY_TYPE_RUN: &str = "run";

// ============================================================================
// Customer
// ============================================================================

/// A client company that runs are produced for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub password: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

// ============================================================================
// Facility
// ============================================================================

/// Geographic position of a facility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A physical plant containing production lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub fid: String,
    pub name: String,
    pub address: String,
    pub capacity: i64,
    /// Fraction of capacity in use, nominally 0.0..=1.0
    pub utilization: f64,
    pub location: LatLng,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl Facility {
    /// Lightweight reference used by calendar entries
    pub fn to_ref(&self) -> FacilityRef {
        FacilityRef {
            fid: self.fid.clone(),
            name: self.name.clone(),
        }
    }
}

/// Facility reference embedded in calendar entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRef {
    pub fid: String,
    pub name: String,
}

// ============================================================================
// Line / Machine
// ============================================================================

/// A production line running one current run at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub lid: String,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub status: String,
    pub current_fid: String,
    pub current_run: Run,
    #[serde(default)]
    pub machines: Vec<Machine>,
}

/// A piece of equipment on a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub mid: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub current_fid: String,
    pub current_lid: String,
    #[serde(default)]
    pub telemetry: Vec<Telemetry>,
}

/// A telemetry channel reported by a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub unit: String,
    pub max: f64,
    pub min: f64,
    pub label: String,
    pub short_code: String,
}

// ============================================================================
// Run / Calendar
// ============================================================================

/// A scheduled production job for a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub rid: String,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub status: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    pub customer: Customer,
}

/// A calendar-visualizable event; always mirrors a run here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalEntry {
    pub cid: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    pub color: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Free-form JSON document, kept as its serialised text
    pub details: String,
    pub facility: FacilityRef,
}

impl CalEntry {
    /// True when this entry belongs to the given facility
    pub fn belongs_to(&self, fid: &str) -> bool {
        self.facility.fid == fid
    }
}
