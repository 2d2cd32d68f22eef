//! Per-user preferences on `settings.json`.

use std::path::Path;

use async_trait::async_trait;

use kardex_core::types::Settings;

use crate::contracts::SettingsStore;
use crate::error::StoreResult;
use crate::json::{ensure_dir, FamilyFile};

/// JSON flat-file implementation of [`SettingsStore`].
pub struct JsonSettingsStore {
    file: FamilyFile<Settings>,
}

impl JsonSettingsStore {
    pub async fn open(dir: &Path) -> StoreResult<Self> {
        ensure_dir(dir).await?;
        Ok(JsonSettingsStore {
            file: FamilyFile::new(dir, "settings.json", "settings"),
        })
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn save(&self, settings: &Settings) -> StoreResult<()> {
        let record = settings.clone();
        self.file
            .update(move |all| {
                match all.iter_mut().find(|s| s.username == record.username) {
                    Some(existing) => *existing = record,
                    None => all.push(record),
                }
                Ok(())
            })
            .await
    }

    async fn get(&self, username: &str) -> StoreResult<Option<Settings>> {
        let all = self.file.load().await?;
        Ok(all.into_iter().find(|s| s.username == username))
    }

    async fn delete(&self, username: &str) -> StoreResult<bool> {
        let username = username.to_string();
        self.file
            .update(move |all| {
                let before = all.len();
                all.retain(|s| s.username != username);
                Ok(all.len() != before)
            })
            .await
    }
}
