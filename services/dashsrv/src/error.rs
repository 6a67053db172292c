//! Error types for dashsrv

use common::AppError;
use iot_grid::GridError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashSrvError>;

#[derive(Error, Debug)]
pub enum DashSrvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Alert relay error: {0}")]
    Relay(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn relay(msg: impl Into<String>) -> Self {
        Self::Relay(msg.into())
    }
}

impl From<common::ConfigError> for DashSrvError {
    fn from(err: common::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<DashSrvError> for AppError {
    fn from(err: DashSrvError) -> Self {
        match err {
            DashSrvError::InvalidRequest(msg) => AppError::bad_request(msg),
            DashSrvError::Relay(msg) => AppError::bad_gateway("Alert relay failed").with_details(msg),
            DashSrvError::Grid(e) => {
                AppError::internal_error("Data grid error").with_details(e.to_string())
            },
            other => AppError::internal_error(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let err: AppError = DashSrvError::invalid_request("bad body").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.message, "bad body");

        let err: AppError = DashSrvError::relay("broker down").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.error.details.as_deref(), Some("broker down"));

        let err: AppError = DashSrvError::Grid(GridError::Connection("refused".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display() {
        let err = DashSrvError::config("service.port must not be 0");
        assert_eq!(
            err.to_string(),
            "Configuration error: service.port must not be 0"
        );
    }
}
