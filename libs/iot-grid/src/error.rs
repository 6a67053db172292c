//! Error types for iot-grid

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Serialization(err.to_string())
    }
}

#[cfg(feature = "redis-backend")]
impl From<redis::RedisError> for GridError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            GridError::Connection(err.to_string())
        } else {
            GridError::Backend(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
