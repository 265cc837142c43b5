use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

use crate::AppState;
use crate::modules::monitor::schema::{
    CheckResponse, StartMonitorRequest, StartMonitorResponse, StopMonitorResponse,
};
use crate::modules::policy::controller::{policy_error, ApiError};
use crate::modules::policy::schema::ErrorResponse;
use crate::services::monitor::{MonitorSnapshot, MonitorTarget};

pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartMonitorRequest>,
) -> Result<Json<StartMonitorResponse>, ApiError> {
    if let Err(e) = req.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        ));
    }

    let phase = state
        .engine
        .start_monitoring(req.targets.into_iter().map(MonitorTarget::from))
        .await
        .map_err(policy_error)?;
    let tracked = state.engine.monitor_snapshot().await.targets.len();

    Ok(Json(StartMonitorResponse { phase, tracked }))
}

pub async fn stop(State(state): State<Arc<AppState>>) -> Json<StopMonitorResponse> {
    state.engine.stop_monitoring().await;
    Json(StopMonitorResponse {
        phase: state.engine.monitor_snapshot().await.phase,
    })
}

/// Runs a sweep and waits for it
pub async fn check(State(state): State<Arc<AppState>>) -> Result<Json<CheckResponse>, ApiError> {
    let not_active = || {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("Monitoring is not active")),
        )
    };

    let handle = state.engine.force_check().await.ok_or_else(not_active)?;
    let report = handle
        .await
        .map_err(|e| {
            tracing::error!("Forced sweep task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Sweep failed")),
            )
        })?
        .ok_or_else(not_active)?;

    Ok(Json(CheckResponse {
        polled: report.polled,
        succeeded: report.succeeded,
        failed: report.failed,
        changes: report.changes,
        cadence: report.cadence,
        next_interval_secs: report.next_interval.as_secs_f64(),
    }))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<MonitorSnapshot> {
    Json(state.engine.monitor_snapshot().await)
}
