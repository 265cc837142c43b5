use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ConfigStore, OwnerPolicy, StoreError};
use crate::services::schedule::ScheduleConfig;
use crate::services::sla::SlaConfig;

/// Process-local store, used by tests and as a stand-in when no file is configured
#[derive(Default)]
pub struct InMemoryConfigStore {
    owners: RwLock<HashMap<String, OwnerPolicy>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(owner_id: &str, policy: OwnerPolicy) -> Self {
        Self {
            owners: RwLock::new(HashMap::from([(owner_id.to_string(), policy)])),
        }
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load_schedule_config(&self, owner_id: &str) -> Result<Option<ScheduleConfig>, StoreError> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner_id).and_then(|policy| policy.schedule.clone()))
    }

    async fn save_schedule_config(&self, owner_id: &str, config: &ScheduleConfig) -> Result<(), StoreError> {
        let mut owners = self.owners.write().await;
        owners.entry(owner_id.to_string()).or_default().schedule = Some(config.clone());
        Ok(())
    }

    async fn load_sla_config(&self, owner_id: &str) -> Result<Option<SlaConfig>, StoreError> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner_id).and_then(|policy| policy.sla.clone()))
    }

    async fn save_sla_config(&self, owner_id: &str, config: &SlaConfig) -> Result<(), StoreError> {
        let mut owners = self.owners.write().await;
        owners.entry(owner_id.to_string()).or_default().sla = Some(config.clone());
        Ok(())
    }
}
