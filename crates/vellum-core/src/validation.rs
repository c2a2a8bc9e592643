//! Structural validation for caller-supplied input.
//!
//! Presence and shape checks only. Relationship checks (does the template
//! resolve, is the actor the creator) belong to the engine; nothing here
//! touches a store.

use crate::error::ValidationError;
use crate::ids::UserId;
use crate::template::TemplateField;

/// Validate the caller-supplied parts of a new document.
///
/// `signers` may be empty: a document can start life unshared. Duplicate
/// ids are rejected here rather than silently collapsed, so the
/// one-slot-per-user invariant holds at every entry point, not just at
/// share time.
pub fn validate_new_document(title: &str, signers: &[UserId]) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    for (i, user) in signers.iter().enumerate() {
        if signers[..i].contains(user) {
            return Err(ValidationError::DuplicateSigner(*user));
        }
    }

    Ok(())
}

/// Validate the caller-supplied parts of a new or updated template.
pub fn validate_new_template(name: &str, fields: &[TemplateField]) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyTemplateName);
    }

    for field in fields {
        if field.name.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
    }

    Ok(())
}

/// Validate a new directory entry.
pub fn validate_new_user(username: &str, email: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }

    if email.trim().is_empty() || !email.contains('@') {
        return Err(ValidationError::InvalidEmail(email.to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::FieldKind;

    #[test]
    fn test_title_must_be_nonempty() {
        assert!(matches!(
            validate_new_document("", &[]),
            Err(ValidationError::EmptyTitle)
        ));
        assert!(matches!(
            validate_new_document("   ", &[]),
            Err(ValidationError::EmptyTitle)
        ));
        assert!(validate_new_document("NDA", &[]).is_ok());
    }

    #[test]
    fn test_empty_signer_list_is_fine() {
        assert!(validate_new_document("NDA", &[]).is_ok());
    }

    #[test]
    fn test_duplicate_signers_rejected() {
        let a = UserId::from_bytes([1; 16]);
        let b = UserId::from_bytes([2; 16]);
        assert!(validate_new_document("NDA", &[a, b]).is_ok());
        assert!(matches!(
            validate_new_document("NDA", &[a, b, a]),
            Err(ValidationError::DuplicateSigner(dup)) if dup == a
        ));
    }

    #[test]
    fn test_template_field_names_nonempty() {
        let field = TemplateField {
            name: String::new(),
            kind: FieldKind::Text,
            required: true,
            label: "Party A".into(),
        };
        assert!(matches!(
            validate_new_template("Retainer", &[field]),
            Err(ValidationError::EmptyFieldName)
        ));
        assert!(matches!(
            validate_new_template("", &[]),
            Err(ValidationError::EmptyTemplateName)
        ));
    }

    #[test]
    fn test_user_email_needs_at_sign() {
        assert!(validate_new_user("alice", "alice@example.com").is_ok());
        assert!(matches!(
            validate_new_user("alice", "alice.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_new_user("", "alice@example.com"),
            Err(ValidationError::EmptyUsername)
        ));
    }
}
