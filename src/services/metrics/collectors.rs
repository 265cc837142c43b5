use std::sync::Arc;
use std::time::Duration;

use super::MetricsRegistry;
use crate::services::sla::SlaVerdict;

/// Collector for poller metrics
#[derive(Clone)]
pub struct MonitorMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl MonitorMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_sweep(&self, trigger: &str) {
        self.metrics
            .monitor_sweeps_total
            .with_label_values(&[trigger])
            .inc();
    }

    pub fn record_lookup(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.metrics
            .monitor_lookups_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn record_status_change(&self, new_status: &str) {
        self.metrics
            .monitor_status_changes_total
            .with_label_values(&[new_status])
            .inc();
    }

    pub fn set_poll_interval(&self, interval: Duration) {
        self.metrics
            .monitor_poll_interval_seconds
            .set(interval.as_secs_f64());
    }

    pub fn set_tracked_targets(&self, count: usize) {
        self.metrics.monitor_tracked_targets.set(count as f64);
    }
}

/// Collector for business-hours and SLA evaluations
#[derive(Clone)]
pub struct PolicyMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl PolicyMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_business_hours(&self, is_open: bool) {
        let result = if is_open { "open" } else { "closed" };
        self.metrics
            .business_hours_checks_total
            .with_label_values(&[result])
            .inc();
    }

    pub fn record_sla_verdict(&self, verdict: &SlaVerdict) {
        self.metrics
            .sla_verdicts_total
            .with_label_values(&[verdict.kind.as_str(), verdict.state_label()])
            .inc();
    }
}
