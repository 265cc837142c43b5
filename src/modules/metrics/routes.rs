use axum::{routing::get, Router};
use std::sync::Arc;

use crate::services::metrics::MetricsRegistry;
use super::controller::get_metrics;

pub fn metrics_routes<S>(metrics: Arc<MetricsRegistry>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(metrics)
}
