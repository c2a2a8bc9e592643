//! Recording and declining signatures.

use vellum_core::fingerprint::SIGNATURE_DOMAIN;
use vellum_core::{canonical, Document, Fingerprint, SignerStatus, UserId};

use crate::completion::evaluate_completion;
use crate::error::{LifecycleError, Result};

/// Outcome of a successful sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOutcome {
    /// Whether this signature completed the document.
    pub completed: bool,
    /// The instant recorded on the signer slot.
    pub signed_at: i64,
}

/// Record `signer`'s signature on `doc` at `now`.
///
/// The first slot for `signer` in list order decides (there is at most one;
/// the one-slot-per-user invariant is enforced at creation and share time).
/// Signing is idempotent-as-failure: a repeat attempt returns
/// [`LifecycleError::AlreadySigned`] and leaves the original signature
/// untouched.
///
/// A late signature on an already-completed document lands normally but
/// never restamps `completed_at`.
pub fn record_signature(doc: &mut Document, signer: &UserId, now: i64) -> Result<SignOutcome> {
    let document_id = doc.id;

    let slot = doc.signer_mut(signer).ok_or(LifecycleError::NotASigner)?;

    match slot.status {
        SignerStatus::Pending => {}
        SignerStatus::Signed => {
            return Err(LifecycleError::AlreadySigned {
                signed_at: slot.signed_at,
            });
        }
        SignerStatus::Rejected => return Err(LifecycleError::AlreadyDeclined),
    }

    slot.status = SignerStatus::Signed;
    slot.signed_at = Some(now);
    slot.signature = Some(Fingerprint::digest(
        SIGNATURE_DOMAIN,
        &canonical::signature_preimage(&document_id, signer, now),
    ));

    let completed = evaluate_completion(doc, now);

    Ok(SignOutcome {
        completed,
        signed_at: now,
    })
}

/// Decline `signer`'s slot on `doc` at `now`.
///
/// Declined slots are terminal and block completion, but the document
/// itself is untouched: a decline never moves the document out of its
/// current status.
pub fn decline_signature(
    doc: &mut Document,
    signer: &UserId,
    now: i64,
    notes: Option<String>,
) -> Result<()> {
    let slot = doc.signer_mut(signer).ok_or(LifecycleError::NotASigner)?;

    match slot.status {
        SignerStatus::Pending => {}
        SignerStatus::Signed => {
            return Err(LifecycleError::AlreadySigned {
                signed_at: slot.signed_at,
            });
        }
        SignerStatus::Rejected => return Err(LifecycleError::AlreadyDeclined),
    }

    slot.status = SignerStatus::Rejected;
    slot.signed_at = Some(now);
    slot.notes = notes;

    Ok(())
}
