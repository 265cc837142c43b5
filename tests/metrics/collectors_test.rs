use std::time::Duration;

use chrono::Utc;
use helpdesk_policy::services::metrics::{MetricsRegistry, MonitorMetricsCollector, PolicyMetricsCollector};
use helpdesk_policy::services::sla::{compute_verdict, SlaConfig};

// =============================================================================
// INTEGRATION TESTS - METRICS COLLECTORS
// =============================================================================

#[test]
fn test_monitor_metrics_collector() {
    let metrics = MetricsRegistry::new().unwrap();
    let collector = MonitorMetricsCollector::new(metrics.clone());

    collector.record_sweep("scheduled");
    collector.record_sweep("forced");
    collector.record_lookup(true);
    collector.record_lookup(false);
    collector.record_status_change("open");
    collector.set_poll_interval(Duration::from_secs(5));
    collector.set_tracked_targets(3);

    let output = metrics.export().unwrap();
    assert!(output.contains("helpdesk_monitor_sweeps_total{trigger=\"forced\"} 1"));
    assert!(output.contains("helpdesk_monitor_lookups_total{outcome=\"failure\"} 1"));
    assert!(output.contains("helpdesk_monitor_status_changes_total{status=\"open\"} 1"));
    assert!(output.contains("helpdesk_monitor_poll_interval_seconds 5"));
    assert!(output.contains("helpdesk_monitor_tracked_targets 3"));
}

#[test]
fn test_policy_metrics_collector() {
    let metrics = MetricsRegistry::new().unwrap();
    let collector = PolicyMetricsCollector::new(metrics.clone());

    collector.record_business_hours(true);
    collector.record_business_hours(false);
    collector.record_business_hours(false);

    let now = Utc::now();
    let verdict = compute_verdict(&SlaConfig::default(), now, None, "low", now).unwrap();
    collector.record_sla_verdict(&verdict);

    let output = metrics.export().unwrap();
    assert!(output.contains("helpdesk_business_hours_checks_total{result=\"closed\"} 2"));
    assert!(output.contains("kind=\"first_response\""));
    assert!(output.contains("state=\"on_track\""));
}

#[test]
fn test_registries_are_independent() {
    let first = MetricsRegistry::new().unwrap();
    let second = MetricsRegistry::new().unwrap();

    MonitorMetricsCollector::new(first.clone()).record_sweep("forced");

    assert!(first.export().unwrap().contains("trigger=\"forced\""));
    assert!(!second.export().unwrap().contains("trigger=\"forced\""));
}
