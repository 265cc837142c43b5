use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tokio::sync::Mutex;

use super::{ConfigStore, OwnerPolicy, PolicyDocument, StoreError};
use crate::services::schedule::ScheduleConfig;
use crate::services::sla::SlaConfig;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid"));

/// Substitute `${VAR_NAME}` with environment variable values.
/// Unset variables are left as written.
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Policy records kept in a single JSON document.
///
/// Reads apply environment substitution; writes go through a temp file and a
/// rename so a crash never leaves a half-written document behind.
pub struct JsonFileConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self, substitute: bool) -> Result<PolicyDocument, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(PolicyDocument::default()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(PolicyDocument::default());
        }

        let content = if substitute {
            substitute_env_vars(&content)
        } else {
            content
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_document(&self, document: &PolicyDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    async fn owner_policy(&self, owner_id: &str) -> Result<Option<OwnerPolicy>, StoreError> {
        let mut document = self.read_document(true).await?;
        Ok(document.owners.remove(owner_id))
    }

    async fn update_owner<F>(&self, owner_id: &str, update: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut OwnerPolicy) + Send,
    {
        let _guard = self.write_lock.lock().await;

        // Raw read so placeholders survive the round trip
        let mut document = self.read_document(false).await?;
        update(document.owners.entry(owner_id.to_string()).or_default());
        self.write_document(&document).await?;

        tracing::debug!("Saved policy document for owner {} to {}", owner_id, self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn load_schedule_config(&self, owner_id: &str) -> Result<Option<ScheduleConfig>, StoreError> {
        Ok(self.owner_policy(owner_id).await?.and_then(|policy| policy.schedule))
    }

    async fn save_schedule_config(&self, owner_id: &str, config: &ScheduleConfig) -> Result<(), StoreError> {
        let config = config.clone();
        self.update_owner(owner_id, move |policy| policy.schedule = Some(config))
            .await
    }

    async fn load_sla_config(&self, owner_id: &str) -> Result<Option<SlaConfig>, StoreError> {
        Ok(self.owner_policy(owner_id).await?.and_then(|policy| policy.sla))
    }

    async fn save_sla_config(&self, owner_id: &str, config: &SlaConfig) -> Result<(), StoreError> {
        let config = config.clone();
        self.update_owner(owner_id, move |policy| policy.sla = Some(config))
            .await
    }
}
