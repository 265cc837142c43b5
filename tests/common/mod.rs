use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use helpdesk_policy::services::config_store::InMemoryConfigStore;
use helpdesk_policy::services::metrics::MetricsRegistry;
use helpdesk_policy::services::monitor::{
    LookupError, MonitorTarget, PollerConfig, StatusLookup, StatusReport,
};
use helpdesk_policy::services::policy::PolicyEngine;

/// Scripted status source.
///
/// The scripted status is read when the lookup starts, then the configured
/// delay elapses. Targets without a scripted status fail with a network error.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeLookup {
    statuses: Mutex<HashMap<String, Result<String, LookupError>>>,
    delay: Mutex<Option<Duration>>,
    target_delays: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

#[allow(dead_code)]
impl FakeLookup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, target: &str, status: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(target.to_string(), Ok(status.to_string()));
    }

    pub fn fail(&self, target: &str) {
        self.statuses.lock().unwrap().insert(
            target.to_string(),
            Err(LookupError::Network("connection refused".to_string())),
        );
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn clear_delay(&self) {
        *self.delay.lock().unwrap() = None;
        self.target_delays.lock().unwrap().clear();
    }

    pub fn set_target_delay(&self, target: &str, delay: Duration) {
        self.target_delays
            .lock()
            .unwrap()
            .insert(target.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups that ran to completion (aborted ones are not counted)
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusLookup for FakeLookup {
    async fn fetch_status(&self, target: &MonitorTarget) -> Result<StatusReport, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.statuses.lock().unwrap().get(target.as_str()).cloned();
        let delay = self
            .target_delays
            .lock()
            .unwrap()
            .get(target.as_str())
            .copied()
            .or(*self.delay.lock().unwrap());

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        match scripted {
            Some(Ok(status)) => Ok(StatusReport { status }),
            Some(Err(e)) => Err(e),
            None => Err(LookupError::Network(format!("unknown target {}", target))),
        }
    }
}

/// Poller settings with a long initial delay so tests drive sweeps by hand
#[allow(dead_code)]
pub fn manual_poller_config() -> PollerConfig {
    PollerConfig {
        initial_delay: Duration::from_secs(3600),
        ..PollerConfig::default()
    }
}

#[allow(dead_code)]
pub fn targets(ids: &[&str]) -> Vec<MonitorTarget> {
    ids.iter().map(|id| MonitorTarget::from(*id)).collect()
}

#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub engine: Arc<PolicyEngine>,
    pub lookup: Arc<FakeLookup>,
    pub metrics: Arc<MetricsRegistry>,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let lookup = FakeLookup::new();
        let metrics = MetricsRegistry::new().expect("Failed to create metrics registry");

        let engine = Arc::new(
            PolicyEngine::new(
                "desk",
                Arc::new(InMemoryConfigStore::new()),
                lookup.clone(),
                manual_poller_config(),
            )
            .with_metrics(metrics.clone()),
        );
        engine.load().await;

        let app = helpdesk_policy::create_app(engine.clone(), metrics.clone()).await;
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            engine,
            lookup,
            metrics,
        }
    }
}
