pub mod config;
pub mod modules;
pub mod services;

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use modules::metrics::metrics_routes;
use modules::monitor::monitor_routes;
use modules::policy::policy_routes;
use services::metrics::{metrics_middleware, MetricsRegistry};
use services::policy::PolicyEngine;

pub struct AppState {
    pub engine: Arc<PolicyEngine>,
    pub metrics: Arc<MetricsRegistry>,
}

pub async fn create_app(engine: Arc<PolicyEngine>, metrics: Arc<MetricsRegistry>) -> Router {
    let state = Arc::new(AppState {
        engine,
        metrics: Arc::clone(&metrics),
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/policy", policy_routes())
        .nest("/monitor", monitor_routes())
        .merge(metrics_routes(Arc::clone(&metrics)))
        .layer(middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Helpdesk Policy API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    owner_id: String,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        owner_id: state.engine.owner_id().to_string(),
    })
}
