use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Share of the deadline, counted back from breach, that raises a warning
pub const WARNING_BAND_RATIO: f64 = 0.25;

/// SLA targets for one desk owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaConfig {
    pub first_response_minutes: u32,
    pub resolution_minutes: u32,
    /// Priority label -> deadline multiplier; labels not listed use 1.0
    #[serde(default)]
    pub priority_multiplier: HashMap<String, f64>,
    pub is_active: bool,
}

impl Default for SlaConfig {
    fn default() -> Self {
        let priority_multiplier = [("urgent", 0.25), ("high", 0.5), ("medium", 1.0), ("low", 2.0)]
            .into_iter()
            .map(|(label, multiplier)| (label.to_string(), multiplier))
            .collect();

        Self {
            first_response_minutes: 60,
            resolution_minutes: 480,
            priority_multiplier,
            is_active: true,
        }
    }
}

impl SlaConfig {
    pub fn validate(&self) -> Result<(), SlaConfigError> {
        if self.first_response_minutes == 0 {
            return Err(SlaConfigError::ZeroMinutes("first_response_minutes"));
        }
        if self.resolution_minutes == 0 {
            return Err(SlaConfigError::ZeroMinutes("resolution_minutes"));
        }
        for (priority, multiplier) in &self.priority_multiplier {
            if !multiplier.is_finite() || *multiplier <= 0.0 {
                return Err(SlaConfigError::InvalidMultiplier {
                    priority: priority.clone(),
                    multiplier: *multiplier,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlaConfigPatch {
    pub first_response_minutes: Option<u32>,
    pub resolution_minutes: Option<u32>,
    pub priority_multiplier: Option<HashMap<String, f64>>,
    pub is_active: Option<bool>,
}

impl SlaConfigPatch {
    pub fn apply(self, mut base: SlaConfig) -> SlaConfig {
        if let Some(minutes) = self.first_response_minutes {
            base.first_response_minutes = minutes;
        }
        if let Some(minutes) = self.resolution_minutes {
            base.resolution_minutes = minutes;
        }
        if let Some(multipliers) = self.priority_multiplier {
            base.priority_multiplier = multipliers;
        }
        if let Some(is_active) = self.is_active {
            base.is_active = is_active;
        }
        base
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaKind {
    FirstResponse,
    Resolution,
}

impl SlaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstResponse => "first_response",
            Self::Resolution => "resolution",
        }
    }
}

/// Derived deadline state, recomputed on every query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaVerdict {
    pub kind: SlaKind,
    pub is_breached: bool,
    pub is_warning: bool,
    /// Rounded to the nearest minute; negative once breached
    pub remaining_minutes: i64,
    /// Deadline after the priority multiplier
    pub deadline_minutes: f64,
    /// `None` when the deadline lies beyond the representable date range
    pub due_at: Option<DateTime<Utc>>,
}

impl SlaVerdict {
    pub fn state_label(&self) -> &'static str {
        if self.is_breached {
            "breached"
        } else if self.is_warning {
            "warning"
        } else {
            "on_track"
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlaConfigError {
    #[error("{0} must be greater than zero")]
    ZeroMinutes(&'static str),

    #[error("Invalid multiplier for priority {priority:?}: {multiplier}")]
    InvalidMultiplier { priority: String, multiplier: f64 },
}
