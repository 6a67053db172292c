//! DashSrv - IoT dashboard demo service
//!
//! Seeds the data grid with demo facilities, resets them on request,
//! relays simulated machine alerts and serves rollup summaries under `/utils`.

pub mod alerts;
pub mod api;
pub mod app_state;
pub mod config;
pub mod demo_data;
pub mod error;
pub mod generator;
pub mod reset;
pub mod store_guard;
pub mod summary;

pub use app_state::AppState;
pub use config::DashConfig;
pub use error::{DashSrvError, Result};
