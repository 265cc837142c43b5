use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

const NAMESPACE: &str = "helpdesk";

/// Metrics registry for one engine instance.
///
/// Each instance owns its `Registry`, so several engines (or tests) can run
/// side by side without colliding on metric names.
pub struct MetricsRegistry {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Monitor Metrics
    pub monitor_sweeps_total: CounterVec,
    pub monitor_lookups_total: CounterVec,
    pub monitor_status_changes_total: CounterVec,
    pub monitor_poll_interval_seconds: Gauge,
    pub monitor_tracked_targets: Gauge,

    // Policy Metrics
    pub business_hours_checks_total: CounterVec,
    pub sla_verdicts_total: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests").namespace(NAMESPACE),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration")
                .namespace(NAMESPACE)
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        // Monitor Metrics
        let monitor_sweeps_total = CounterVec::new(
            Opts::new("monitor_sweeps_total", "Status sweeps run by the poller").namespace(NAMESPACE),
            &["trigger"],
        )?;
        registry.register(Box::new(monitor_sweeps_total.clone()))?;

        let monitor_lookups_total = CounterVec::new(
            Opts::new("monitor_lookups_total", "Per-target status lookups").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(monitor_lookups_total.clone()))?;

        let monitor_status_changes_total = CounterVec::new(
            Opts::new("monitor_status_changes_total", "Observed status transitions").namespace(NAMESPACE),
            &["status"],
        )?;
        registry.register(Box::new(monitor_status_changes_total.clone()))?;

        let monitor_poll_interval_seconds = Gauge::with_opts(
            Opts::new("monitor_poll_interval_seconds", "Interval chosen after the last sweep")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(monitor_poll_interval_seconds.clone()))?;

        let monitor_tracked_targets = Gauge::with_opts(
            Opts::new("monitor_tracked_targets", "Targets tracked by the active poller").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(monitor_tracked_targets.clone()))?;

        // Policy Metrics
        let business_hours_checks_total = CounterVec::new(
            Opts::new("business_hours_checks_total", "Business-hours evaluations").namespace(NAMESPACE),
            &["result"],
        )?;
        registry.register(Box::new(business_hours_checks_total.clone()))?;

        let sla_verdicts_total = CounterVec::new(
            Opts::new("sla_verdicts_total", "SLA verdicts computed").namespace(NAMESPACE),
            &["kind", "state"],
        )?;
        registry.register(Box::new(sla_verdicts_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            monitor_sweeps_total,
            monitor_lookups_total,
            monitor_status_changes_total,
            monitor_poll_interval_seconds,
            monitor_tracked_targets,
            business_hours_checks_total,
            sla_verdicts_total,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
