use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::monitor::{Cadence, PollerPhase, StatusChange};

#[derive(Debug, Deserialize, Validate)]
pub struct StartMonitorRequest {
    #[validate(length(max = 500, message = "At most 500 targets can be monitored"))]
    pub targets: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartMonitorResponse {
    pub phase: PollerPhase,
    pub tracked: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopMonitorResponse {
    pub phase: PollerPhase,
}

/// Result of a forced sweep
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub polled: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub changes: Vec<StatusChange>,
    pub cadence: Cadence,
    pub next_interval_secs: f64,
}
