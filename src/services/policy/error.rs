use axum::http::StatusCode;

use crate::services::config_store::StoreError;
use crate::services::monitor::MonitorError;
use crate::services::schedule::ScheduleEntryError;
use crate::services::sla::SlaConfigError;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Config store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleEntryError),

    #[error("Invalid SLA config: {0}")]
    InvalidSla(#[from] SlaConfigError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),
}

impl PolicyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidSchedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidSla(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Monitor(_) => StatusCode::CONFLICT,
        }
    }
}
