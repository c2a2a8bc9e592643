//! External anchoring abstraction.
//!
//! An [`Anchor`] registers creation fingerprints with an external ledger so
//! a third party can attest that a document existed in a given form.
//! Registration happens at creation and again at completion, and is
//! best-effort; a vault whose anchor is down still completes documents.

use std::sync::Mutex;

use async_trait::async_trait;

use vellum_core::{DocumentId, Fingerprint};

/// Proof that a fingerprint was registered with the anchoring service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorReceipt {
    pub fingerprint: Fingerprint,
    /// Service-assigned reference, e.g. a transaction id.
    pub reference: String,
}

/// Fingerprint anchoring trait.
///
/// Implementations must be thread-safe (Send + Sync). Errors are opaque:
/// the dispatcher logs them and moves on.
#[async_trait]
pub trait Anchor: Send + Sync {
    /// Register a document's creation fingerprint with the ledger.
    async fn register(
        &self,
        document: &DocumentId,
        fingerprint: &Fingerprint,
    ) -> anyhow::Result<AnchorReceipt>;

    /// Whether `fingerprint` has been registered.
    async fn check(&self, fingerprint: &Fingerprint) -> anyhow::Result<bool>;
}

/// An anchor that accepts everything and remembers nothing.
pub struct NoopAnchor;

#[async_trait]
impl Anchor for NoopAnchor {
    async fn register(
        &self,
        _document: &DocumentId,
        fingerprint: &Fingerprint,
    ) -> anyhow::Result<AnchorReceipt> {
        Ok(AnchorReceipt {
            fingerprint: *fingerprint,
            reference: "noop".into(),
        })
    }

    async fn check(&self, _fingerprint: &Fingerprint) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// An in-memory anchor ledger. For tests.
#[derive(Default)]
pub struct RecordingAnchor {
    registered: Mutex<Vec<(DocumentId, Fingerprint)>>,
}

impl RecordingAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registration so far, in order.
    pub fn registered(&self) -> Vec<(DocumentId, Fingerprint)> {
        self.registered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Anchor for RecordingAnchor {
    async fn register(
        &self,
        document: &DocumentId,
        fingerprint: &Fingerprint,
    ) -> anyhow::Result<AnchorReceipt> {
        let mut registered = self.registered.lock().unwrap();
        registered.push((*document, *fingerprint));
        Ok(AnchorReceipt {
            fingerprint: *fingerprint,
            reference: format!("anchor-{}", registered.len()),
        })
    }

    async fn check(&self, fingerprint: &Fingerprint) -> anyhow::Result<bool> {
        let registered = self.registered.lock().unwrap();
        Ok(registered.iter().any(|(_, f)| f == fingerprint))
    }
}

/// An anchor that always fails. For tests.
pub struct FailingAnchor;

#[async_trait]
impl Anchor for FailingAnchor {
    async fn register(
        &self,
        _document: &DocumentId,
        _fingerprint: &Fingerprint,
    ) -> anyhow::Result<AnchorReceipt> {
        Err(anyhow::anyhow!("ledger unreachable"))
    }

    async fn check(&self, _fingerprint: &Fingerprint) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("ledger unreachable"))
    }
}
