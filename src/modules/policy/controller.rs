use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::AppState;
use crate::modules::policy::schema::{
    BusinessHoursQuery, BusinessHoursResponse, ErrorResponse, RefreshResponse,
    ScheduleConfigResponse, SlaConfigResponse, SlaVerdictRequest, SlaVerdictResponse,
};
use crate::services::policy::PolicyError;
use crate::services::schedule::ScheduleConfigPatch;
use crate::services::sla::SlaConfigPatch;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn policy_error(e: PolicyError) -> ApiError {
    let status = e.status_code();
    if status.is_server_error() {
        tracing::error!("Policy request failed: {}", e);
    }
    (status, Json(ErrorResponse::new(e.to_string())))
}

// =============================================================================
// BUSINESS HOURS
// =============================================================================

pub async fn business_hours(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BusinessHoursQuery>,
) -> Json<BusinessHoursResponse> {
    let at = query.at.unwrap_or_else(Utc::now);

    let is_open = state.engine.is_open(at).await;
    let auto_reply = if is_open {
        None
    } else {
        state.engine.auto_reply_for(at).await
    };

    Json(BusinessHoursResponse {
        is_open,
        auto_reply,
        evaluated_at: at,
    })
}

// =============================================================================
// CONFIG RECORDS
// =============================================================================

pub async fn get_schedule(State(state): State<Arc<AppState>>) -> Json<ScheduleConfigResponse> {
    Json(ScheduleConfigResponse {
        config: state.engine.schedule_config().await,
    })
}

pub async fn put_schedule(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ScheduleConfigPatch>,
) -> Result<Json<ScheduleConfigResponse>, ApiError> {
    let config = state.engine.save_schedule_config(patch).await.map_err(policy_error)?;
    Ok(Json(ScheduleConfigResponse { config: Some(config) }))
}

pub async fn get_sla(State(state): State<Arc<AppState>>) -> Json<SlaConfigResponse> {
    Json(SlaConfigResponse {
        config: state.engine.sla_config().await,
    })
}

pub async fn put_sla(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SlaConfigPatch>,
) -> Result<Json<SlaConfigResponse>, ApiError> {
    let config = state.engine.save_sla_config(patch).await.map_err(policy_error)?;
    Ok(Json(SlaConfigResponse { config: Some(config) }))
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>, ApiError> {
    state.engine.refresh().await.map_err(policy_error)?;

    Ok(Json(RefreshResponse {
        schedule_loaded: state.engine.schedule_config().await.is_some(),
        sla_loaded: state.engine.sla_config().await.is_some(),
    }))
}

// =============================================================================
// SLA VERDICT
// =============================================================================

pub async fn sla_verdict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SlaVerdictRequest>,
) -> Result<Json<SlaVerdictResponse>, ApiError> {
    if let Err(e) = req.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        ));
    }

    let verdict = state
        .engine
        .sla_verdict(
            req.created_at,
            req.first_responded_at,
            &req.priority,
            req.now.unwrap_or_else(Utc::now),
        )
        .await;

    Ok(Json(SlaVerdictResponse { verdict }))
}
