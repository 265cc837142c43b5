mod memory;
mod json_file;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::services::schedule::ScheduleConfig;
use crate::services::sla::SlaConfig;

pub use memory::InMemoryConfigStore;
pub use json_file::{substitute_env_vars, JsonFileConfigStore};

/// Persistent home of the policy records.
///
/// Saves always replace the whole record for the owner.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_schedule_config(&self, owner_id: &str) -> Result<Option<ScheduleConfig>, StoreError>;
    async fn save_schedule_config(&self, owner_id: &str, config: &ScheduleConfig) -> Result<(), StoreError>;
    async fn load_sla_config(&self, owner_id: &str) -> Result<Option<SlaConfig>, StoreError>;
    async fn save_sla_config(&self, owner_id: &str, config: &SlaConfig) -> Result<(), StoreError>;
}

/// Records kept for one desk owner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla: Option<SlaConfig>,
}

/// On-disk document: `{ "owners": { "<owner_id>": { "schedule": ..., "sla": ... } } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub owners: HashMap<String, OwnerPolicy>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
