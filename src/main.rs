use std::sync::Arc;

use helpdesk_policy::config::Config;
use helpdesk_policy::services::config_store::JsonFileConfigStore;
use helpdesk_policy::services::metrics::MetricsRegistry;
use helpdesk_policy::services::monitor::{HttpStatusLookup, TracingSink};
use helpdesk_policy::services::policy::PolicyEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_policy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    let store = Arc::new(JsonFileConfigStore::new(&config.policy_store_path));
    tracing::info!("Policy store at {}", store.path().display());

    let lookup = Arc::new(HttpStatusLookup::new(
        &config.status_api_url,
        &config.status_api_key,
        config.status_api_timeout,
    ));

    let metrics = MetricsRegistry::new().expect("Failed to create metrics registry");

    let engine = Arc::new(
        PolicyEngine::new(config.owner_id.clone(), store, lookup, config.poller.clone())
            .with_metrics(Arc::clone(&metrics)),
    );
    engine.add_status_sink(Arc::new(TracingSink));
    engine.load().await;

    if let Err(e) = engine.start_monitoring(config.monitor_targets.clone()).await {
        tracing::error!("Failed to start status monitoring: {}", e);
    }

    let app = helpdesk_policy::create_app(Arc::clone(&engine), metrics).await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await
        .expect("Server error");

    engine.stop_monitoring().await;
}
