//! # Audit Recorder
//!
//! Writes the append-only trail on behalf of every service.
//!
//! ## Never Fails the Caller
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inventory / SalesEngine / Users                                        │
//! │       │  state change already decided                                   │
//! │       ▼                                                                 │
//! │  AuditRecorder::record(event)                                           │
//! │       │                                                                 │
//! │       ├── append ok      → done                                         │
//! │       └── append failed  → tracing::error! and swallow                  │
//! │                                                                         │
//! │  A sale that happened must not be un-happened because the audit file    │
//! │  was briefly unwritable. The trail is best-effort evidence, not a       │
//! │  gatekeeper.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::error;

use kardex_core::types::{AuditEvent, AuditKind, AuditOutcome};
use kardex_store::{AuditStore, StoreResult};

/// Shared recorder over an [`AuditStore`]. Cloning is cheap.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        AuditRecorder { store }
    }

    /// Appends an event. Storage failures are logged and swallowed; the
    /// triggering operation has already succeeded or been rejected on its
    /// own merits.
    pub async fn record(&self, event: AuditEvent) {
        if let Err(e) = self.store.append(&event).await {
            error!(
                kind = %event.kind,
                target = %event.target,
                error = %e,
                "Failed to append audit event"
            );
        }
    }

    /// Records a successful action.
    pub async fn success(
        &self,
        actor: &str,
        kind: AuditKind,
        target: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.record(AuditEvent::new(
            actor,
            kind,
            target,
            AuditOutcome::Success,
            message,
        ))
        .await;
    }

    /// Records a rejected action.
    pub async fn rejected(
        &self,
        actor: &str,
        kind: AuditKind,
        target: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.record(AuditEvent::new(
            actor,
            kind,
            target,
            AuditOutcome::Rejected,
            message,
        ))
        .await;
    }

    /// Most recent events, newest first.
    pub async fn recent(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        self.store.list(Some(limit)).await
    }

    /// All events touching one entity, newest first.
    pub async fn for_target(&self, target: &str) -> StoreResult<Vec<AuditEvent>> {
        let mut events = self.store.list(None).await?;
        events.retain(|e| e.target == target);
        Ok(events)
    }
}
