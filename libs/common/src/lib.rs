//! Dashboard basic library
//!
//! Provides functions shared by all dashboard services, including:
//! - logging and HTTP request logging
//! - standard API response envelopes
//! - layered configuration loading
//! - graceful shutdown

pub mod api_types;
pub mod config_loader;
pub mod logging;
pub mod shutdown;

// Re-export commonly used API types
pub use api_types::{ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse};

// Re-export AppError when axum feature is enabled
#[cfg(feature = "axum")]
pub use api_types::AppError;

pub use config_loader::{ConfigError, ConfigLoader};
