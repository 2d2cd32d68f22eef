//! Audit trail on the `audit_log` table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use kardex_core::types::{AuditEvent, AuditKind, AuditOutcome};

use crate::contracts::AuditStore;
use crate::error::{StoreError, StoreResult};

/// SQLite implementation of [`AuditStore`].
///
/// Append-only: the `seq` column preserves append order, and no delete
/// statement exists anywhere in this module.
#[derive(Debug, Clone)]
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteAuditStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: String,
    ts: DateTime<Utc>,
    actor: String,
    kind: String,
    target: String,
    outcome: String,
    message: String,
    details: String,
}

impl AuditRow {
    fn into_event(self) -> StoreResult<AuditEvent> {
        let kind: AuditKind = serde_json::from_value(serde_json::Value::String(self.kind))
            .map_err(|e| StoreError::corrupt("audit event", format!("kind: {e}")))?;
        let outcome: AuditOutcome = serde_json::from_value(serde_json::Value::String(self.outcome))
            .map_err(|e| StoreError::corrupt("audit event", format!("outcome: {e}")))?;
        let details: BTreeMap<String, String> = serde_json::from_str(&self.details)
            .map_err(|e| StoreError::corrupt("audit event", format!("details: {e}")))?;

        Ok(AuditEvent {
            id: self.id,
            ts: self.ts,
            actor: self.actor,
            kind,
            target: self.target,
            outcome,
            message: self.message,
            details,
        })
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn append(&self, event: &AuditEvent) -> StoreResult<()> {
        let details = serde_json::to_string(&event.details)
            .map_err(|e| StoreError::corrupt("audit event", format!("details: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, ts, actor, kind, target, outcome, message, details)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&event.id)
        .bind(event.ts)
        .bind(&event.actor)
        .bind(event.kind.as_str())
        .bind(&event.target)
        .bind(event.outcome.as_str())
        .bind(&event.message)
        .bind(details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, limit: Option<usize>) -> StoreResult<Vec<AuditEvent>> {
        // SQLite treats LIMIT -1 as unlimited
        let limit = limit.map(|n| n as i64).unwrap_or(-1);

        let rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT id, ts, actor, kind, target, outcome, message, details \
             FROM audit_log ORDER BY seq DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditRow::into_event).collect()
    }

    async fn get(&self, id: &str) -> StoreResult<Option<AuditEvent>> {
        let row: Option<AuditRow> = sqlx::query_as(
            "SELECT id, ts, actor, kind, target, outcome, message, details \
             FROM audit_log WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AuditRow::into_event).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{Database, DbConfig};

    async fn store() -> SqliteAuditStore {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        SqliteAuditStore::new(db.pool().clone())
    }

    fn event(message: &str) -> AuditEvent {
        AuditEvent::new(
            "ana",
            AuditKind::Security,
            "admin_china",
            AuditOutcome::Rejected,
            message,
        )
        .with_detail("attempted_role", "operator")
    }

    #[tokio::test]
    async fn append_order_wins_over_timestamps() {
        let store = store().await;
        // Second event carries an *earlier* timestamp on purpose
        let mut early = event("late append, early clock");
        early.ts = Utc::now() - chrono::Duration::hours(1);

        store.append(&event("first")).await.unwrap();
        store.append(&early).await.unwrap();

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed[0].message, "late append, early clock");
        assert_eq!(listed[1].message, "first");
    }

    #[tokio::test]
    async fn round_trip_keeps_details() {
        let store = store().await;
        let ev = event("rejected role change");
        store.append(&ev).await.unwrap();

        let loaded = store.get(&ev.id).await.unwrap().unwrap();
        assert_eq!(loaded.kind, AuditKind::Security);
        assert_eq!(loaded.outcome, AuditOutcome::Rejected);
        assert_eq!(
            loaded.details.get("attempted_role").map(String::as_str),
            Some("operator")
        );
    }

    #[tokio::test]
    async fn limit_bounds_the_listing() {
        let store = store().await;
        for i in 0..5 {
            store.append(&event(&format!("event {i}"))).await.unwrap();
        }
        assert_eq!(store.list(Some(2)).await.unwrap().len(), 2);
    }
}
