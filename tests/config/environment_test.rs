use std::time::Duration;

use helpdesk_policy::config::Config;
use helpdesk_policy::services::monitor::MonitorTarget;
use serial_test::serial;

const VARS: &[&str] = &[
    "BIND_ADDR",
    "DESK_OWNER_ID",
    "POLICY_STORE_PATH",
    "STATUS_API_URL",
    "STATUS_API_KEY",
    "STATUS_API_TIMEOUT_SECS",
    "MONITOR_ENABLED",
    "MONITOR_TARGETS",
    "MONITOR_INTERVAL_SECS",
    "MONITOR_FAST_INTERVAL_SECS",
    "MONITOR_INITIAL_DELAY_MS",
    "MONITOR_TRANSITIONAL_STATUSES",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[serial]
#[test]
fn defaults_apply_when_only_status_url_is_set() {
    clear_env();
    std::env::set_var("STATUS_API_URL", "http://status.local");

    let config = Config::from_env().unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.owner_id, "default");
    assert_eq!(config.policy_store_path, "policy.json");
    assert_eq!(config.status_api_timeout, Duration::from_secs(10));
    assert!(config.monitor_targets.is_empty());
    assert!(config.poller.enabled);
    assert_eq!(config.poller.interval, Duration::from_secs(30));
    assert_eq!(config.poller.fast_interval, Duration::from_secs(5));
    assert_eq!(config.poller.initial_delay, Duration::from_millis(1000));
    assert_eq!(config.poller.transitional_statuses, vec!["connecting", "pending"]);

    clear_env();
}

#[serial]
#[test]
fn missing_status_url_is_an_error() {
    clear_env();

    let err = Config::from_env().err().unwrap();
    assert!(err.contains("STATUS_API_URL"));
}

#[serial]
#[test]
fn monitor_settings_are_parsed() {
    clear_env();
    std::env::set_var("STATUS_API_URL", "http://status.local");
    std::env::set_var("MONITOR_TARGETS", "inbox-1, inbox-2,,inbox-1");
    std::env::set_var("MONITOR_ENABLED", "false");
    std::env::set_var("MONITOR_INTERVAL_SECS", "60");
    std::env::set_var("MONITOR_FAST_INTERVAL_SECS", "2");
    std::env::set_var("MONITOR_TRANSITIONAL_STATUSES", "Connecting, qrcode");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.monitor_targets,
        vec![MonitorTarget::from("inbox-1"), MonitorTarget::from("inbox-2")]
    );
    assert!(!config.poller.enabled);
    assert_eq!(config.poller.interval, Duration::from_secs(60));
    assert_eq!(config.poller.fast_interval, Duration::from_secs(2));
    assert_eq!(config.poller.transitional_statuses, vec!["connecting", "qrcode"]);

    clear_env();
}

#[serial]
#[test]
fn fast_interval_must_be_shorter_than_normal() {
    clear_env();
    std::env::set_var("STATUS_API_URL", "http://status.local");
    std::env::set_var("MONITOR_INTERVAL_SECS", "5");
    std::env::set_var("MONITOR_FAST_INTERVAL_SECS", "5");

    assert!(Config::from_env().is_err());

    clear_env();
}

#[serial]
#[test]
fn malformed_numbers_are_rejected() {
    clear_env();
    std::env::set_var("STATUS_API_URL", "http://status.local");
    std::env::set_var("MONITOR_INTERVAL_SECS", "soon");

    let err = Config::from_env().err().unwrap();
    assert!(err.contains("MONITOR_INTERVAL_SECS"));

    clear_env();
}
