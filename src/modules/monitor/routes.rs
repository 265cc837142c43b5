use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn monitor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(controller::start))
        .route("/stop", post(controller::stop))
        .route("/check", post(controller::check))
        .route("/status", get(controller::status))
}
