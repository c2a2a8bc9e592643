//! Completion evaluation.
//!
//! One rule, one place. Completion used to be easy to get subtly wrong
//! when re-checked ad hoc after each mutation; every lifecycle operation
//! funnels through [`evaluate_completion`] instead.

use vellum_core::{Document, DocumentStatus};

/// Evaluate the completion rule after a mutation.
///
/// Promotes the document to `Signed` and stamps `completed_at` when every
/// signer slot is signed. Returns `true` only when this call performed the
/// promotion.
///
/// - An empty signer list never completes: a document with nobody to sign
///   stays where it is.
/// - An already-signed document is left alone; late signatures never
///   restamp `completed_at`.
/// - A document in a status with no legal edge to `Signed` (a stored
///   `rejected` record) is left alone as well.
pub fn evaluate_completion(doc: &mut Document, now: i64) -> bool {
    if !doc.all_signed() {
        return false;
    }
    if doc.status == DocumentStatus::Signed {
        return false;
    }
    if !doc.status.can_advance(DocumentStatus::Signed) {
        return false;
    }

    doc.status = DocumentStatus::Signed;
    if doc.completed_at.is_none() {
        doc.completed_at = Some(now);
    }
    true
}

/// Initial status for a new document.
///
/// No signer slots means there is nothing to await: the document is a
/// draft. Any slots at all and it starts pending.
pub fn initial_status(signer_count: usize) -> DocumentStatus {
    if signer_count == 0 {
        DocumentStatus::Draft
    } else {
        DocumentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::{Content, DocumentId, Signer, SignerStatus, TemplateId, UserId};

    fn doc_with(signers: Vec<Signer>, status: DocumentStatus) -> Document {
        Document {
            id: DocumentId::from_bytes([1; 16]),
            title: "Test".into(),
            template: TemplateId::from_bytes([2; 16]),
            content: Content::new(),
            status,
            created_by: UserId::from_bytes([3; 16]),
            signers,
            fingerprint: None,
            created_at: 1000,
            completed_at: None,
            revision: 0,
        }
    }

    fn signed_slot(n: u8) -> Signer {
        let mut slot = Signer::listed(UserId::from_bytes([n; 16]));
        slot.status = SignerStatus::Signed;
        slot.signed_at = Some(2000);
        slot
    }

    #[test]
    fn test_zero_signers_never_complete() {
        let mut doc = doc_with(vec![], DocumentStatus::Draft);
        assert!(!evaluate_completion(&mut doc, 3000));
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert_eq!(doc.completed_at, None);
    }

    #[test]
    fn test_all_signed_promotes_once() {
        let mut doc = doc_with(vec![signed_slot(1), signed_slot(2)], DocumentStatus::Pending);

        assert!(evaluate_completion(&mut doc, 3000));
        assert_eq!(doc.status, DocumentStatus::Signed);
        assert_eq!(doc.completed_at, Some(3000));

        // Re-evaluation is a no-op and never restamps.
        assert!(!evaluate_completion(&mut doc, 4000));
        assert_eq!(doc.completed_at, Some(3000));
    }

    #[test]
    fn test_pending_slot_blocks() {
        let mut doc = doc_with(
            vec![signed_slot(1), Signer::listed(UserId::from_bytes([2; 16]))],
            DocumentStatus::Pending,
        );
        assert!(!evaluate_completion(&mut doc, 3000));
        assert_eq!(doc.status, DocumentStatus::Pending);
    }

    #[test]
    fn test_declined_slot_blocks_without_propagating() {
        let mut declined = Signer::listed(UserId::from_bytes([2; 16]));
        declined.status = SignerStatus::Rejected;

        let mut doc = doc_with(vec![signed_slot(1), declined], DocumentStatus::Pending);
        assert!(!evaluate_completion(&mut doc, 3000));

        // The decline stays on the slot; the document is not rejected.
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(doc.completed_at, None);
    }

    #[test]
    fn test_draft_promotes_directly_to_signed() {
        let mut doc = doc_with(vec![signed_slot(1)], DocumentStatus::Draft);
        assert!(evaluate_completion(&mut doc, 3000));
        assert_eq!(doc.status, DocumentStatus::Signed);
    }

    #[test]
    fn test_terminal_rejected_record_left_alone() {
        let mut doc = doc_with(vec![signed_slot(1)], DocumentStatus::Rejected);
        assert!(!evaluate_completion(&mut doc, 3000));
        assert_eq!(doc.status, DocumentStatus::Rejected);
        assert_eq!(doc.completed_at, None);
    }

    #[test]
    fn test_initial_status_rule() {
        assert_eq!(initial_status(0), DocumentStatus::Draft);
        assert_eq!(initial_status(1), DocumentStatus::Pending);
        assert_eq!(initial_status(5), DocumentStatus::Pending);
    }
}
