use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a monitored resource (e.g. a messaging connection id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorTarget(String);

impl MonitorTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MonitorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MonitorTarget {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MonitorTarget {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Trim, drop blanks and collapse duplicates while keeping first-seen order
pub fn normalize_targets(targets: impl IntoIterator<Item = MonitorTarget>) -> Vec<MonitorTarget> {
    let mut seen = std::collections::HashSet::new();
    targets
        .into_iter()
        .map(|target| MonitorTarget::new(target.as_str().trim()))
        .filter(|target| !target.is_blank())
        .filter(|target| seen.insert(target.clone()))
        .collect()
}

/// Poller tuning
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub enabled: bool,
    /// Cadence while every target is settled
    pub interval: Duration,
    /// Cadence while any target is transitional; must be below `interval`
    pub fast_interval: Duration,
    /// Delay before the first sweep after `start`
    pub initial_delay: Duration,
    pub transitional_statuses: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(30),
            fast_interval: Duration::from_secs(5),
            initial_delay: Duration::from_secs(1),
            transitional_statuses: vec!["connecting".to_string(), "pending".to_string()],
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.fast_interval.is_zero() {
            return Err("fast interval must be greater than zero".to_string());
        }
        if self.fast_interval >= self.interval {
            return Err(format!(
                "fast interval ({:?}) must be shorter than the normal interval ({:?})",
                self.fast_interval, self.interval
            ));
        }
        Ok(())
    }

    pub fn is_transitional(&self, status: &str) -> bool {
        self.transitional_statuses
            .iter()
            .any(|transitional| transitional.eq_ignore_ascii_case(status))
    }

    pub fn interval_for(&self, cadence: Cadence) -> Duration {
        match cadence {
            Cadence::Fast => self.fast_interval,
            Cadence::Normal => self.interval,
        }
    }
}

/// Poller lifecycle: Idle <-> Active, then terminal Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerPhase {
    Idle,
    Active,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Fast,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    Scheduled,
    Forced,
}

impl SweepTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Forced => "forced",
        }
    }
}

/// Body returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub last_known_status: String,
    pub last_polled_at: DateTime<Utc>,
    /// Sequence number of the lookup that produced this status; later lookups win
    pub sequence: u64,
}

/// In-memory view owned by one poller; rebuilt on every (re)start
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub targets: Vec<MonitorTarget>,
    pub statuses: HashMap<MonitorTarget, TargetStatus>,
    pub cadence: Cadence,
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::with_targets(Vec::new())
    }
}

impl MonitorState {
    pub fn with_targets(targets: Vec<MonitorTarget>) -> Self {
        Self {
            targets,
            statuses: HashMap::new(),
            cadence: Cadence::Normal,
            last_sweep_at: None,
        }
    }

    pub fn cadence_for(&self, config: &PollerConfig) -> Cadence {
        let transitional = self
            .statuses
            .values()
            .any(|status| config.is_transitional(&status.last_known_status));

        if transitional {
            Cadence::Fast
        } else {
            Cadence::Normal
        }
    }
}

/// Emitted once per observed transition of a target's status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: Uuid,
    pub target: MonitorTarget,
    pub previous_status: String,
    pub new_status: String,
    pub observed_at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(
        target: MonitorTarget,
        previous_status: String,
        new_status: String,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            previous_status,
            new_status,
            observed_at,
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub polled: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub changes: Vec<StatusChange>,
    pub cadence: Cadence,
    pub next_interval: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSnapshot {
    pub target: MonitorTarget,
    pub last_known_status: Option<String>,
    pub last_polled_at: Option<DateTime<Utc>>,
}

/// Read-only copy of the poller's state
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub phase: PollerPhase,
    pub cadence: Cadence,
    pub targets: Vec<TargetSnapshot>,
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl MonitorSnapshot {
    /// Snapshot reported before any poller has been started
    pub fn idle() -> Self {
        Self {
            phase: PollerPhase::Idle,
            cadence: Cadence::Normal,
            targets: Vec::new(),
            last_sweep_at: None,
        }
    }

    pub fn status_of(&self, target: &MonitorTarget) -> Option<&str> {
        self.targets
            .iter()
            .find(|snapshot| &snapshot.target == target)
            .and_then(|snapshot| snapshot.last_known_status.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Status API returned HTTP {status}")]
    Api { status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Lookup task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    #[error("Poller has been stopped and cannot be restarted")]
    PollerStopped,
}
