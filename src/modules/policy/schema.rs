use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::schedule::ScheduleConfig;
use crate::services::sla::{SlaConfig, SlaVerdict};

// =============================================================================
// BUSINESS HOURS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BusinessHoursQuery {
    /// Instant to evaluate; defaults to now
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessHoursResponse {
    pub is_open: bool,
    pub auto_reply: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

// =============================================================================
// CONFIG RECORDS
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleConfigResponse {
    pub config: Option<ScheduleConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlaConfigResponse {
    pub config: Option<SlaConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub schedule_loaded: bool,
    pub sla_loaded: bool,
}

// =============================================================================
// SLA VERDICT
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SlaVerdictRequest {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub first_responded_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 32, message = "Priority must be 1-32 characters"))]
    pub priority: String,
    /// Instant to evaluate; defaults to now
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlaVerdictResponse {
    pub verdict: Option<SlaVerdict>,
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
