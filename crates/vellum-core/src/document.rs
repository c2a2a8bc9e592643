//! The document aggregate.
//!
//! A [`Document`] owns an ordered list of [`Signer`] slots. Statuses move
//! forward only; the transition tables here are the single source of truth
//! for which moves are legal, and anything absent from them is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content::Content;
use crate::error::CoreError;
use crate::fingerprint::Fingerprint;
use crate::ids::{DocumentId, TemplateId, UserId};

/// Lifecycle state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Created without signers; nothing is awaited.
    Draft,
    /// At least one signer slot exists and not all have signed.
    Pending,
    /// Every signer has signed. Terminal.
    Signed,
    /// Terminal parity state for stored records. No operation produces it.
    Rejected,
}

impl DocumentStatus {
    /// Stable string form, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Signed => "signed",
            DocumentStatus::Rejected => "rejected",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "pending" => Ok(DocumentStatus::Pending),
            "signed" => Ok(DocumentStatus::Signed),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(CoreError::UnknownDocumentStatus(other.to_owned())),
        }
    }

    /// Whether the forward-only table permits `self -> to`.
    ///
    /// The only legal document moves are promotions to `Signed` once every
    /// signer has signed. Nothing moves a document into `Rejected`.
    pub fn can_advance(&self, to: DocumentStatus) -> bool {
        matches!(
            (self, to),
            (DocumentStatus::Draft, DocumentStatus::Signed)
                | (DocumentStatus::Pending, DocumentStatus::Signed)
        )
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Signed | DocumentStatus::Rejected)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a single signer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignerStatus {
    Pending,
    Signed,
    Rejected,
}

impl SignerStatus {
    /// Stable string form, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignerStatus::Pending => "pending",
            SignerStatus::Signed => "signed",
            SignerStatus::Rejected => "rejected",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(SignerStatus::Pending),
            "signed" => Ok(SignerStatus::Signed),
            "rejected" => Ok(SignerStatus::Rejected),
            other => Err(CoreError::UnknownSignerStatus(other.to_owned())),
        }
    }

    /// Whether the forward-only table permits `self -> to`.
    ///
    /// `Signed` and `Rejected` are terminal: there is no sign-then-unsign
    /// and no decline-then-sign.
    pub fn can_advance(&self, to: SignerStatus) -> bool {
        matches!(
            (self, to),
            (SignerStatus::Pending, SignerStatus::Signed)
                | (SignerStatus::Pending, SignerStatus::Rejected)
        )
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SignerStatus::Signed | SignerStatus::Rejected)
    }
}

impl fmt::Display for SignerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-user signature slot inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// The user this slot belongs to. At most one slot per user per document.
    pub user: UserId,
    pub status: SignerStatus,
    /// When the signature landed (Unix ms). Set together with `signature`.
    pub signed_at: Option<i64>,
    /// Digest over `{document_id, signer_id, signed_at}`.
    pub signature: Option<Fingerprint>,
    /// Free-form note, e.g. a decline reason.
    pub notes: Option<String>,
    /// When this slot was added via share. `None` for creation-listed signers.
    pub added_at: Option<i64>,
    /// Who shared the document to this user. `None` for creation-listed signers.
    pub added_by: Option<UserId>,
}

impl Signer {
    /// A pending slot for a signer listed at creation.
    pub fn listed(user: UserId) -> Self {
        Self {
            user,
            status: SignerStatus::Pending,
            signed_at: None,
            signature: None,
            notes: None,
            added_at: None,
            added_by: None,
        }
    }

    /// A pending slot for a signer invited after creation.
    pub fn invited(user: UserId, added_by: UserId, added_at: i64) -> Self {
        Self {
            user,
            status: SignerStatus::Pending,
            signed_at: None,
            signature: None,
            notes: None,
            added_at: Some(added_at),
            added_by: Some(added_by),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SignerStatus::Pending
    }

    pub fn is_signed(&self) -> bool {
        self.status == SignerStatus::Signed
    }
}

/// The document aggregate root.
///
/// `fingerprint` is optional: records that predate fingerprinting (or were
/// written by a defective client) carry `None`, and verification reports
/// them unverified rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub template: TemplateId,
    pub content: Content,
    pub status: DocumentStatus,
    pub created_by: UserId,
    /// Ordered signer slots. Order is part of the record.
    pub signers: Vec<Signer>,
    pub fingerprint: Option<Fingerprint>,
    /// Creation instant (Unix ms). Input to the creation digest; immutable.
    pub created_at: i64,
    /// Set exactly once, when the document completes.
    pub completed_at: Option<i64>,
    /// Store-managed revision for conditional updates.
    pub revision: u64,
}

impl Document {
    /// First signer slot for `user`, in list order.
    pub fn signer(&self, user: &UserId) -> Option<&Signer> {
        self.signers.iter().find(|s| s.user == *user)
    }

    /// Mutable first signer slot for `user`, in list order.
    pub fn signer_mut(&mut self, user: &UserId) -> Option<&mut Signer> {
        self.signers.iter_mut().find(|s| s.user == *user)
    }

    /// Whether `user` holds any slot, regardless of its status.
    pub fn has_signer(&self, user: &UserId) -> bool {
        self.signers.iter().any(|s| s.user == *user)
    }

    /// Whether every slot is signed. An empty signer list is never
    /// "all signed": a document with nobody to sign cannot complete.
    pub fn all_signed(&self) -> bool {
        !self.signers.is_empty() && self.signers.iter().all(Signer::is_signed)
    }

    pub fn is_creator(&self, user: &UserId) -> bool {
        self.created_by == *user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DOCUMENT: [DocumentStatus; 4] = [
        DocumentStatus::Draft,
        DocumentStatus::Pending,
        DocumentStatus::Signed,
        DocumentStatus::Rejected,
    ];

    const ALL_SIGNER: [SignerStatus; 3] = [
        SignerStatus::Pending,
        SignerStatus::Signed,
        SignerStatus::Rejected,
    ];

    fn doc_with_signers(signers: Vec<Signer>) -> Document {
        Document {
            id: DocumentId::from_bytes([1; 16]),
            title: "Test".into(),
            template: TemplateId::from_bytes([2; 16]),
            content: Content::new(),
            status: DocumentStatus::Pending,
            created_by: UserId::from_bytes([3; 16]),
            signers,
            fingerprint: None,
            created_at: 1000,
            completed_at: None,
            revision: 0,
        }
    }

    #[test]
    fn test_document_table_only_promotes_to_signed() {
        for from in ALL_DOCUMENT {
            for to in ALL_DOCUMENT {
                let allowed = from.can_advance(to);
                let expected = matches!(
                    (from, to),
                    (DocumentStatus::Draft, DocumentStatus::Signed)
                        | (DocumentStatus::Pending, DocumentStatus::Signed)
                );
                assert_eq!(allowed, expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_nothing_advances_into_document_rejected() {
        for from in ALL_DOCUMENT {
            assert!(!from.can_advance(DocumentStatus::Rejected), "{from}");
        }
    }

    #[test]
    fn test_signer_table_is_forward_only() {
        for from in ALL_SIGNER {
            for to in ALL_SIGNER {
                let allowed = from.can_advance(to);
                let expected = from == SignerStatus::Pending && to != SignerStatus::Pending;
                assert_eq!(allowed, expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DocumentStatus::Draft.is_terminal());
        assert!(!DocumentStatus::Pending.is_terminal());
        assert!(DocumentStatus::Signed.is_terminal());
        assert!(DocumentStatus::Rejected.is_terminal());

        assert!(!SignerStatus::Pending.is_terminal());
        assert!(SignerStatus::Signed.is_terminal());
        assert!(SignerStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in ALL_DOCUMENT {
            assert_eq!(DocumentStatus::parse(status.as_str()).unwrap(), status);
        }
        for status in ALL_SIGNER {
            assert_eq!(SignerStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(DocumentStatus::parse("archived").is_err());
        assert!(SignerStatus::parse("declined").is_err());
    }

    #[test]
    fn test_all_signed_requires_nonempty() {
        let empty = doc_with_signers(vec![]);
        assert!(!empty.all_signed());

        let mut one = doc_with_signers(vec![Signer::listed(UserId::from_bytes([9; 16]))]);
        assert!(!one.all_signed());

        one.signers[0].status = SignerStatus::Signed;
        assert!(one.all_signed());
    }

    #[test]
    fn test_rejected_signer_blocks_all_signed() {
        let mut doc = doc_with_signers(vec![
            Signer::listed(UserId::from_bytes([8; 16])),
            Signer::listed(UserId::from_bytes([9; 16])),
        ]);
        doc.signers[0].status = SignerStatus::Signed;
        doc.signers[1].status = SignerStatus::Rejected;
        assert!(!doc.all_signed());
    }

    #[test]
    fn test_signer_lookup_first_match() {
        let user = UserId::from_bytes([7; 16]);
        let doc = doc_with_signers(vec![Signer::listed(user)]);
        assert!(doc.has_signer(&user));
        assert!(doc.signer(&user).unwrap().is_pending());
        assert!(doc.signer(&UserId::from_bytes([6; 16])).is_none());
    }

    #[test]
    fn test_invited_slot_carries_provenance() {
        let user = UserId::from_bytes([4; 16]);
        let by = UserId::from_bytes([5; 16]);
        let slot = Signer::invited(user, by, 777);
        assert_eq!(slot.added_at, Some(777));
        assert_eq!(slot.added_by, Some(by));
        assert!(slot.is_pending());

        let listed = Signer::listed(user);
        assert_eq!(listed.added_at, None);
        assert_eq!(listed.added_by, None);
    }
}
