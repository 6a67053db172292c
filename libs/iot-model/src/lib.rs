//! IoT Dashboard Model Library
//!
//! Entity types shared by the data grid and the dashboard services.
//! This library is pure data: no storage, no I/O.
//!
//! # Modules
//!
//! - `entities`: Customer, Facility, Line, Machine, Telemetry, Run, CalEntry
//! - `summary`: Rollup records and severity classification for the UI
//!
//! All types serialise with camelCase field names, descriptions as `desc`
//! and timestamps as epoch milliseconds, which is the shape the dashboard
//! front end consumes.

pub mod entities;
pub mod summary;

pub use entities::{
    CalEntry, Customer, Facility, FacilityRef, LatLng, Line, Machine, Run, Telemetry,
    CAL_ENTRY_TYPE_RUN, STATUS_OK,
};
pub use summary::{Severity, Summary};
