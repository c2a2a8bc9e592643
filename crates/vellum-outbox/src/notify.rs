//! Notice delivery abstraction.
//!
//! A [`Notifier`] carries signing lifecycle notices to users. Delivery is
//! best-effort: implementations may talk to a mail relay, a webhook, or
//! nothing at all, and the engine never blocks a commit on the result.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vellum_core::{Document, DocumentId, User};

/// A single notice to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A signature was requested from `to`.
    SigningRequested {
        /// Recipient email address.
        to: String,
        document: DocumentId,
        title: String,
        /// Username of whoever listed or invited the signer.
        requested_by: String,
    },
    /// `to`'s own signature was recorded.
    SignatureConfirmed {
        to: String,
        document: DocumentId,
        title: String,
    },
    /// Every signer has signed; sent to the document's creator.
    DocumentCompleted {
        to: String,
        document: DocumentId,
        title: String,
    },
}

impl Notice {
    /// A signing request to `to`, attributed to `requested_by`.
    pub fn signing_requested(to: &User, document: &Document, requested_by: &User) -> Self {
        Notice::SigningRequested {
            to: to.email.clone(),
            document: document.id,
            title: document.title.clone(),
            requested_by: requested_by.username.clone(),
        }
    }

    /// A confirmation that `to`'s signature landed.
    pub fn signature_confirmed(to: &User, document: &Document) -> Self {
        Notice::SignatureConfirmed {
            to: to.email.clone(),
            document: document.id,
            title: document.title.clone(),
        }
    }

    /// A completion notice for the creator.
    pub fn document_completed(to: &User, document: &Document) -> Self {
        Notice::DocumentCompleted {
            to: to.email.clone(),
            document: document.id,
            title: document.title.clone(),
        }
    }

    /// The recipient email address.
    pub fn recipient(&self) -> &str {
        match self {
            Notice::SigningRequested { to, .. }
            | Notice::SignatureConfirmed { to, .. }
            | Notice::DocumentCompleted { to, .. } => to,
        }
    }

    /// The document this notice concerns.
    pub fn document(&self) -> DocumentId {
        match self {
            Notice::SigningRequested { document, .. }
            | Notice::SignatureConfirmed { document, .. }
            | Notice::DocumentCompleted { document, .. } => *document,
        }
    }
}

/// Notice delivery trait.
///
/// Implementations must be thread-safe (Send + Sync). Errors are opaque:
/// the dispatcher logs them and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notice to its recipient.
    async fn deliver(&self, notice: &Notice) -> anyhow::Result<()>;
}

/// A notifier that silently drops everything. The embedded-use default.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn deliver(&self, _notice: &Notice) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A notifier that keeps every delivered notice. For tests.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in order.
    pub fn delivered(&self) -> Vec<Notice> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notice: &Notice) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// A notifier that always fails, counting the attempts. For tests.
#[derive(Default)]
pub struct FailingNotifier {
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _notice: &Notice) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("notifier offline"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::{Content, DocumentStatus, Role, TemplateId, UserId};

    fn user(username: &str, email: &str) -> User {
        User {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            role: Role::Member,
            created_at: 1,
        }
    }

    fn doc(title: &str) -> Document {
        Document {
            id: DocumentId::generate(),
            title: title.into(),
            template: TemplateId::generate(),
            content: Content::new(),
            status: DocumentStatus::Pending,
            created_by: UserId::generate(),
            signers: vec![],
            fingerprint: None,
            created_at: 1,
            completed_at: None,
            revision: 0,
        }
    }

    #[test]
    fn test_notice_builders_capture_recipient_and_document() {
        let alice = user("alice", "alice@example.com");
        let bob = user("bob", "bob@example.com");
        let agreement = doc("NDA");

        let request = Notice::signing_requested(&alice, &agreement, &bob);
        assert_eq!(request.recipient(), "alice@example.com");
        assert_eq!(request.document(), agreement.id);
        assert!(matches!(
            request,
            Notice::SigningRequested { ref requested_by, .. } if requested_by == "bob"
        ));

        let done = Notice::document_completed(&bob, &agreement);
        assert_eq!(done.recipient(), "bob@example.com");
    }

    #[tokio::test]
    async fn test_recording_notifier_keeps_order() {
        let alice = user("alice", "alice@example.com");
        let agreement = doc("NDA");
        let notifier = RecordingNotifier::new();

        notifier
            .deliver(&Notice::signature_confirmed(&alice, &agreement))
            .await
            .unwrap();
        notifier
            .deliver(&Notice::document_completed(&alice, &agreement))
            .await
            .unwrap();

        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), 2);
        assert!(matches!(delivered[0], Notice::SignatureConfirmed { .. }));
        assert!(matches!(delivered[1], Notice::DocumentCompleted { .. }));
    }

    #[tokio::test]
    async fn test_failing_notifier_counts_attempts() {
        let alice = user("alice", "alice@example.com");
        let agreement = doc("NDA");
        let notifier = FailingNotifier::new();

        assert!(notifier
            .deliver(&Notice::signature_confirmed(&alice, &agreement))
            .await
            .is_err());
        assert_eq!(notifier.attempts(), 1);
    }
}
