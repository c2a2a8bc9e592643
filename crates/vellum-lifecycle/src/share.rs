//! Sharing documents with additional signers.

use vellum_core::{Document, Signer, UserId};

use crate::error::{LifecycleError, Result};

/// Outcome of a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// A pending slot was appended; the document must be written back.
    Added,
    /// The user already held a slot; nothing changed, nothing to write.
    AlreadyPresent,
}

/// Add `user` as a pending signer on behalf of `actor`.
///
/// Creator-only; admins do not bypass this check. Re-sharing to a user who
/// already holds a slot (whatever its status) is a no-op success: it never
/// resets the slot and never appends a duplicate. Sharing never changes the
/// document status, even when it adds the first slot to a draft.
pub fn add_signer(
    doc: &mut Document,
    actor: &UserId,
    user: &UserId,
    now: i64,
) -> Result<ShareOutcome> {
    if !doc.is_creator(actor) {
        return Err(LifecycleError::NotCreator);
    }

    if doc.has_signer(user) {
        return Ok(ShareOutcome::AlreadyPresent);
    }

    doc.signers.push(Signer::invited(*user, *actor, now));
    Ok(ShareOutcome::Added)
}
