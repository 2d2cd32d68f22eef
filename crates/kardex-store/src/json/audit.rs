//! Audit trail on `audit_log.json`.

use std::path::Path;

use async_trait::async_trait;

use kardex_core::types::AuditEvent;

use crate::contracts::AuditStore;
use crate::error::StoreResult;
use crate::json::{ensure_dir, FamilyFile};

/// JSON flat-file implementation of [`AuditStore`].
///
/// Events are kept in append order; there is no delete path at all.
pub struct JsonAuditStore {
    file: FamilyFile<AuditEvent>,
}

impl JsonAuditStore {
    pub async fn open(dir: &Path) -> StoreResult<Self> {
        ensure_dir(dir).await?;
        Ok(JsonAuditStore {
            file: FamilyFile::new(dir, "audit_log.json", "audit event"),
        })
    }
}

#[async_trait]
impl AuditStore for JsonAuditStore {
    async fn append(&self, event: &AuditEvent) -> StoreResult<()> {
        let record = event.clone();
        self.file
            .update(move |events| {
                events.push(record);
                Ok(())
            })
            .await
    }

    async fn list(&self, limit: Option<usize>) -> StoreResult<Vec<AuditEvent>> {
        let mut events = self.file.load().await?;
        events.reverse(); // newest first
        if let Some(limit) = limit {
            events.truncate(limit);
        }
        Ok(events)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<AuditEvent>> {
        let events = self.file.load().await?;
        Ok(events.into_iter().find(|e| e.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kardex_core::types::{AuditKind, AuditOutcome};

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kardex-audit-{}", uuid::Uuid::new_v4().simple()))
    }

    fn event(message: &str) -> AuditEvent {
        AuditEvent::new(
            "ana",
            AuditKind::Stock,
            "SKU-00001",
            AuditOutcome::Success,
            message,
        )
    }

    #[tokio::test]
    async fn list_is_newest_first_and_bounded() {
        let store = JsonAuditStore::open(&scratch_dir()).await.unwrap();
        store.append(&event("first")).await.unwrap();
        store.append(&event("second")).await.unwrap();
        store.append(&event("third")).await.unwrap();

        let recent = store.list(Some(2)).await.unwrap();
        let messages: Vec<&str> = recent.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second"]);

        assert_eq!(store.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn get_by_id() {
        let store = JsonAuditStore::open(&scratch_dir()).await.unwrap();
        let ev = event("hello");
        store.append(&ev).await.unwrap();

        assert_eq!(store.get(&ev.id).await.unwrap().unwrap().message, "hello");
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
