//! Post-commit dispatch.
//!
//! The [`Outbox`] owns the collaborator handles and fans one committed
//! engine event out to them. Dispatch is awaited but infallible from the
//! caller's point of view: every collaborator error is logged at WARN and
//! swallowed, because the operation that triggered it has already
//! committed.

use std::sync::Arc;

use vellum_core::{ActivityRecord, DocumentId, Fingerprint};

use crate::anchor::{Anchor, NoopAnchor};
use crate::audit::{AuditSink, NoopAudit};
use crate::notify::{NoopNotifier, Notice, Notifier};

/// Dispatcher for collaborator side effects.
pub struct Outbox {
    notifier: Arc<dyn Notifier>,
    anchor: Arc<dyn Anchor>,
    audit: Arc<dyn AuditSink>,
}

impl Outbox {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        anchor: Arc<dyn Anchor>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            notifier,
            anchor,
            audit,
        }
    }

    /// All collaborators silenced.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopNotifier), Arc::new(NoopAnchor), Arc::new(NoopAudit))
    }

    /// Record an audit entry with no accompanying notices.
    ///
    /// Used for registrations, template changes, and role updates.
    pub async fn activity(&self, record: &ActivityRecord) {
        self.push_audit(record).await;
    }

    /// Creation: audit entry, a signing request to every listed signer,
    /// and registration of the creation fingerprint with the anchor.
    pub async fn document_created(
        &self,
        record: &ActivityRecord,
        requests: Vec<Notice>,
        document: &DocumentId,
        fingerprint: Option<&Fingerprint>,
    ) {
        self.push_audit(record).await;
        for notice in &requests {
            self.push_notice(notice).await;
        }
        self.register_anchor(document, fingerprint).await;
    }

    /// Share: audit entry plus a signing request to the invited signer.
    ///
    /// The request is optional because recipient resolution is
    /// best-effort; the caller passes `None` when it could not build one.
    pub async fn signer_invited(&self, record: &ActivityRecord, request: Option<Notice>) {
        self.push_audit(record).await;
        if let Some(notice) = request {
            self.push_notice(&notice).await;
        }
    }

    /// Sign: audit entry plus a confirmation to the signer, when the
    /// signer resolves to a recipient.
    pub async fn signature_recorded(&self, record: &ActivityRecord, confirmation: Option<Notice>) {
        self.push_audit(record).await;
        if let Some(notice) = confirmation {
            self.push_notice(&notice).await;
        }
    }

    /// Completion: notify the creator, when known, and re-anchor the
    /// creation fingerprint.
    pub async fn document_completed(
        &self,
        notice: Option<Notice>,
        document: &DocumentId,
        fingerprint: Option<&Fingerprint>,
    ) {
        if let Some(notice) = notice {
            self.push_notice(&notice).await;
        }
        self.register_anchor(document, fingerprint).await;
    }

    /// Whether `fingerprint` is registered with the anchor.
    ///
    /// Read-only; a failing anchor reads as "not anchored" after a warning.
    pub async fn is_anchored(&self, fingerprint: &Fingerprint) -> bool {
        match self.anchor.check(fingerprint).await {
            Ok(present) => present,
            Err(error) => {
                tracing::warn!(%error, "anchor lookup failed");
                false
            }
        }
    }

    async fn register_anchor(&self, document: &DocumentId, fingerprint: Option<&Fingerprint>) {
        if let Some(fingerprint) = fingerprint {
            match self.anchor.register(document, fingerprint).await {
                Ok(receipt) => {
                    tracing::debug!(
                        document = %document,
                        reference = %receipt.reference,
                        "fingerprint anchored"
                    );
                }
                Err(error) => {
                    tracing::warn!(document = %document, %error, "anchor registration failed");
                }
            }
        }
    }

    async fn push_audit(&self, record: &ActivityRecord) {
        if let Err(error) = self.audit.record(record).await {
            tracing::warn!(action = record.action.as_str(), %error, "audit sink failed");
        }
    }

    async fn push_notice(&self, notice: &Notice) {
        if let Err(error) = self.notifier.deliver(notice).await {
            tracing::warn!(to = notice.recipient(), %error, "notice delivery failed");
        }
    }
}
