use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn policy_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/business-hours", get(controller::business_hours))
        .route("/schedule", get(controller::get_schedule).put(controller::put_schedule))
        .route("/sla", get(controller::get_sla).put(controller::put_sla))
        .route("/sla/verdict", post(controller::sla_verdict))
        .route("/refresh", post(controller::refresh))
}
