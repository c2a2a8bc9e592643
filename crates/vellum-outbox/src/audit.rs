//! Audit trail abstraction.
//!
//! An [`AuditSink`] receives one entry per committed operation. The usual
//! sink is [`StoreAudit`], which lands entries in the record store's
//! activity log; tests swap in [`RecordingAudit`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vellum_core::ActivityRecord;
use vellum_store::RecordStore;

/// Activity recording trait.
///
/// Implementations must be thread-safe (Send + Sync). Errors are opaque:
/// the dispatcher logs them and moves on.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one activity entry.
    async fn record(&self, record: &ActivityRecord) -> anyhow::Result<()>;
}

/// An audit sink that drops everything.
pub struct NoopAudit;

#[async_trait]
impl AuditSink for NoopAudit {
    async fn record(&self, _record: &ActivityRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// An audit sink that keeps entries in memory. For tests.
#[derive(Default)]
pub struct RecordingAudit {
    entries: Mutex<Vec<ActivityRecord>>,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    pub fn entries(&self) -> Vec<ActivityRecord> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn record(&self, record: &ActivityRecord) -> anyhow::Result<()> {
        self.entries.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// An audit sink that always fails. For tests.
pub struct FailingAudit;

#[async_trait]
impl AuditSink for FailingAudit {
    async fn record(&self, _record: &ActivityRecord) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("audit sink offline"))
    }
}

/// Persists activity entries through the record store.
pub struct StoreAudit<S> {
    store: Arc<S>,
}

impl<S> StoreAudit<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RecordStore> AuditSink for StoreAudit<S> {
    async fn record(&self, record: &ActivityRecord) -> anyhow::Result<()> {
        self.store.append_activity(record).await?;
        Ok(())
    }
}
