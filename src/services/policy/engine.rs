use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

use super::PolicyError;
use crate::services::config_store::ConfigStore;
use crate::services::metrics::{MetricsRegistry, MonitorMetricsCollector, PolicyMetricsCollector};
use crate::services::monitor::{
    AdaptivePoller, MonitorSnapshot, MonitorTarget, PollerConfig, PollerPhase, StatusChange,
    StatusChangeSink, StatusLookup, StatusNotifier, SweepReport,
};
use crate::services::schedule::{self, ScheduleConfig, ScheduleConfigPatch};
use crate::services::sla::{self, SlaConfig, SlaConfigPatch, SlaVerdict};

/// Composition root for one desk owner.
///
/// Holds session copies of the schedule and SLA records, answers the
/// business-hours and SLA queries against them, and owns the status poller.
/// A record that has not been loaded counts as "feature disabled".
pub struct PolicyEngine {
    owner_id: String,
    store: Arc<dyn ConfigStore>,
    lookup: Arc<dyn StatusLookup>,
    poller_config: PollerConfig,
    metrics: Option<Arc<MetricsRegistry>>,
    policy_metrics: Option<PolicyMetricsCollector>,
    schedule: RwLock<Option<ScheduleConfig>>,
    sla: RwLock<Option<SlaConfig>>,
    poller: Mutex<Option<AdaptivePoller>>,
    notifier: StatusNotifier,
}

impl PolicyEngine {
    pub fn new(
        owner_id: impl Into<String>,
        store: Arc<dyn ConfigStore>,
        lookup: Arc<dyn StatusLookup>,
        poller_config: PollerConfig,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            store,
            lookup,
            poller_config,
            metrics: None,
            policy_metrics: None,
            schedule: RwLock::new(None),
            sla: RwLock::new(None),
            poller: Mutex::new(None),
            notifier: StatusNotifier::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.policy_metrics = Some(PolicyMetricsCollector::new(Arc::clone(&metrics)));
        self.metrics = Some(metrics);
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Initial load at start-up. Failures are logged and leave both features disabled.
    pub async fn load(&self) {
        if let Err(e) = self.refresh().await {
            tracing::error!("Failed to load policy config for owner {}: {}", self.owner_id, e);
        }
    }

    /// Reload both records from the store.
    ///
    /// Nothing is replaced unless both loads succeed.
    pub async fn refresh(&self) -> Result<(), PolicyError> {
        let schedule = self.store.load_schedule_config(&self.owner_id).await?;
        let sla = self.store.load_sla_config(&self.owner_id).await?;

        tracing::info!(
            "Policy config loaded for owner {} (schedule: {}, sla: {})",
            self.owner_id,
            schedule.is_some(),
            sla.is_some()
        );

        *self.schedule.write().await = schedule;
        *self.sla.write().await = sla;
        Ok(())
    }

    pub async fn schedule_config(&self) -> Option<ScheduleConfig> {
        self.schedule.read().await.clone()
    }

    pub async fn sla_config(&self) -> Option<SlaConfig> {
        self.sla.read().await.clone()
    }

    /// Merge `patch` onto the current record (or the default), validate, persist, then cache
    pub async fn save_schedule_config(&self, patch: ScheduleConfigPatch) -> Result<ScheduleConfig, PolicyError> {
        let mut cached = self.schedule.write().await;

        let updated = patch.apply(cached.clone().unwrap_or_default());
        updated.validate()?;
        self.store.save_schedule_config(&self.owner_id, &updated).await?;

        *cached = Some(updated.clone());
        tracing::info!("Schedule config saved for owner {}", self.owner_id);
        Ok(updated)
    }

    pub async fn save_sla_config(&self, patch: SlaConfigPatch) -> Result<SlaConfig, PolicyError> {
        let mut cached = self.sla.write().await;

        let updated = patch.apply(cached.clone().unwrap_or_default());
        updated.validate()?;
        self.store.save_sla_config(&self.owner_id, &updated).await?;

        *cached = Some(updated.clone());
        tracing::info!("SLA config saved for owner {}", self.owner_id);
        Ok(updated)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub async fn is_open(&self, now: DateTime<Utc>) -> bool {
        let open = match self.schedule.read().await.as_ref() {
            Some(config) => schedule::is_open(config, now),
            None => true,
        };

        if let Some(metrics) = &self.policy_metrics {
            metrics.record_business_hours(open);
        }
        open
    }

    pub async fn auto_reply_for(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.schedule.read().await;
        schedule::next_open_message(guard.as_ref()?, now)
    }

    pub async fn sla_verdict(
        &self,
        created_at: DateTime<Utc>,
        first_responded_at: Option<DateTime<Utc>>,
        priority: &str,
        now: DateTime<Utc>,
    ) -> Option<SlaVerdict> {
        let guard = self.sla.read().await;
        let verdict = sla::compute_verdict(guard.as_ref()?, created_at, first_responded_at, priority, now)?;

        if let Some(metrics) = &self.policy_metrics {
            metrics.record_sla_verdict(&verdict);
        }
        Some(verdict)
    }

    // =========================================================================
    // MONITORING
    // =========================================================================

    /// Replace any running poller with a fresh one tracking `targets`
    pub async fn start_monitoring(
        &self,
        targets: impl IntoIterator<Item = MonitorTarget>,
    ) -> Result<PollerPhase, PolicyError> {
        let mut slot = self.poller.lock().await;

        if let Some(previous) = slot.take() {
            previous.stop().await;
        }

        let poller = AdaptivePoller::new(
            self.poller_config.clone(),
            Arc::clone(&self.lookup),
            self.notifier.clone(),
            self.metrics.clone().map(MonitorMetricsCollector::new),
        );
        let phase = poller.start(targets).await?;
        *slot = Some(poller);

        Ok(phase)
    }

    pub async fn stop_monitoring(&self) {
        if let Some(poller) = self.poller.lock().await.as_ref() {
            poller.stop().await;
        }
    }

    /// Trigger an immediate sweep; `None` when no poller is active
    pub async fn force_check(&self) -> Option<JoinHandle<Option<SweepReport>>> {
        let slot = self.poller.lock().await;
        let poller = slot.as_ref()?;

        if poller.phase().await != PollerPhase::Active {
            return None;
        }
        Some(poller.force_check())
    }

    pub async fn monitor_snapshot(&self) -> MonitorSnapshot {
        match self.poller.lock().await.as_ref() {
            Some(poller) => poller.snapshot().await,
            None => MonitorSnapshot::idle(),
        }
    }

    /// Status transitions from every poller this engine starts
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.notifier.subscribe()
    }

    /// Sinks stay registered across monitoring restarts
    pub fn add_status_sink(&self, sink: Arc<dyn StatusChangeSink>) {
        self.notifier.add_sink(sink);
    }
}
