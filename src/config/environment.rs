use std::env;
use std::time::Duration;

use crate::services::monitor::{normalize_targets, MonitorTarget, PollerConfig};

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub bind_addr: String,
    pub owner_id: String,
    pub policy_store_path: String,
    pub status_api_url: String,
    pub status_api_key: String,
    pub status_api_timeout: Duration,
    pub monitor_targets: Vec<MonitorTarget>,
    pub poller: PollerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let owner_id = env::var("DESK_OWNER_ID").unwrap_or_else(|_| "default".to_string());

        let policy_store_path =
            env::var("POLICY_STORE_PATH").unwrap_or_else(|_| "policy.json".to_string());

        let status_api_url = env::var("STATUS_API_URL")
            .map_err(|_| "STATUS_API_URL must be set".to_string())?;

        let status_api_key = env::var("STATUS_API_KEY").unwrap_or_default();

        let status_api_timeout = Duration::from_secs(parse_var("STATUS_API_TIMEOUT_SECS", 10)?);

        let monitor_targets = normalize_targets(
            env::var("MONITOR_TARGETS")
                .unwrap_or_default()
                .split(',')
                .map(MonitorTarget::from),
        );

        let poller = PollerConfig {
            enabled: parse_bool("MONITOR_ENABLED", true)?,
            interval: Duration::from_secs(parse_var("MONITOR_INTERVAL_SECS", 30)?),
            fast_interval: Duration::from_secs(parse_var("MONITOR_FAST_INTERVAL_SECS", 5)?),
            initial_delay: Duration::from_millis(parse_var("MONITOR_INITIAL_DELAY_MS", 1000)?),
            transitional_statuses: env::var("MONITOR_TRANSITIONAL_STATUSES")
                .unwrap_or_else(|_| "connecting,pending".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        poller.validate()?;

        Ok(Self {
            bind_addr,
            owner_id,
            policy_store_path,
            status_api_url,
            status_api_key,
            status_api_timeout,
            monitor_targets,
            poller,
        })
    }
}

fn parse_var(name: &str, default: u64) -> Result<u64, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a non-negative integer, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_bool(name: &str, default: bool) -> Result<bool, String> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be a boolean, got '{}'", name, raw)),
        },
        Err(_) => Ok(default),
    }
}
