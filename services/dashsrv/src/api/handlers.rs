//! Request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::{AppError, HealthStatus, ServiceStatus, SuccessResponse};
use iot_model::Summary;
use tracing::warn;

use crate::alerts::{forward_alert, ControlMessage};
use crate::app_state::AppState;
use crate::error::DashSrvError;

/// Liveness; 503 only when broker checking is enabled and the relay is down
///
/// Otherwise always 200: an unreachable grid or relay reports `degraded`.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<HealthStatus>>, AppError> {
    let relay_connected = state.relay.is_connected();
    if state.config.health.check_broker && !relay_connected {
        return Err(AppError::service_unavailable("Broker disconnected"));
    }

    let grid_status = match state.grid.ping().await {
        Ok(()) => ServiceStatus::Healthy,
        Err(e) => {
            warn!("Grid ping failed: {}", e);
            ServiceStatus::Unhealthy
        },
    };
    let relay_status = if relay_connected {
        ServiceStatus::Healthy
    } else {
        ServiceStatus::Unhealthy
    };

    let health = HealthStatus::healthy(&state.config.service.name, env!("CARGO_PKG_VERSION"))
        .with_check(state.grid.backend_name(), grid_status)
        .with_check(state.relay.name(), relay_status);
    Ok(Json(SuccessResponse::new(health)))
}

/// Forward a simulated alert for `fid/lid/mid`; path segments are not validated
pub async fn simulator_alert(
    State(state): State<Arc<AppState>>,
    Path((fid, lid, mid)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let message: ControlMessage = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected alert body: {}", e);
        DashSrvError::invalid_request(format!("Invalid alert body: {e}"))
    })?;

    forward_alert(state.relay.as_ref(), &fid, &lid, &mid, &message).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_all(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.reset.reset_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unknown facility ids are a silent no-op
pub async fn reset_facility(
    State(state): State<Arc<AppState>>,
    Path(fid): Path<String>,
) -> Result<StatusCode, AppError> {
    state.reset.reset_facility(&fid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Plain JSON array of the six summaries
pub async fn summaries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Summary>>, AppError> {
    Ok(Json(state.summaries.summaries().await?))
}
