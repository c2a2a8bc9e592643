//! Proptest generators for property-based testing.

use proptest::prelude::*;

use vellum_core::fingerprint::DOCUMENT_DOMAIN;
use vellum_core::{
    canonical, Content, Document, DocumentId, FieldValue, Fingerprint, Signer, TemplateId, UserId,
};
use vellum_lifecycle::{initial_status, record_signature};

/// Generate a random UserId.
pub fn user_id() -> impl Strategy<Value = UserId> {
    any::<[u8; 16]>().prop_map(UserId::from_bytes)
}

/// Generate a random DocumentId.
pub fn document_id() -> impl Strategy<Value = DocumentId> {
    any::<[u8; 16]>().prop_map(DocumentId::from_bytes)
}

/// Generate a random TemplateId.
pub fn template_id() -> impl Strategy<Value = TemplateId> {
    any::<[u8; 16]>().prop_map(TemplateId::from_bytes)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate a document title.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,47}".prop_map(String::from)
}

/// Generate a content field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,23}".prop_map(String::from)
}

/// Generate a single field value.
pub fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        "[ -~]{0,64}".prop_map(FieldValue::Text),
        any::<i64>().prop_map(FieldValue::Number),
        timestamp().prop_map(FieldValue::Date),
        any::<bool>().prop_map(FieldValue::Bool),
    ]
}

/// Generate content with up to `max_fields` fields.
pub fn content(max_fields: usize) -> impl Strategy<Value = Content> {
    prop::collection::btree_map(field_name(), field_value(), 0..=max_fields)
}

/// Parameters for generating a document aggregate.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub title: String,
    pub content: Content,
    pub created_by: UserId,
    /// Distinct signer ids, satisfying the one-slot-per-user invariant.
    pub signers: Vec<UserId>,
    pub created_at: i64,
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            title(),
            content(4),
            user_id(),
            prop::collection::hash_set(user_id(), 0..5),
            timestamp(),
        )
            .prop_map(|(title, content, created_by, signers, created_at)| DocumentParams {
                title,
                content,
                created_by,
                signers: signers.into_iter().collect(),
                created_at,
            })
            .boxed()
    }
}

/// Build the document aggregate a vault would store for `params`,
/// creation fingerprint included.
pub fn document_from_params(params: &DocumentParams) -> Document {
    let preimage =
        canonical::creation_preimage(&params.title, &params.content, params.created_at);
    let fingerprint = Fingerprint::digest(DOCUMENT_DOMAIN, &preimage);

    Document {
        id: DocumentId::generate(),
        title: params.title.clone(),
        template: TemplateId::generate(),
        content: params.content.clone(),
        status: initial_status(params.signers.len()),
        created_by: params.created_by,
        signers: params.signers.iter().copied().map(Signer::listed).collect(),
        fingerprint: Some(fingerprint),
        created_at: params.created_at,
        completed_at: None,
        revision: 0,
    }
}

/// Drive `document` to completion by signing every slot in list order,
/// one millisecond apart.
pub fn sign_all(document: &mut Document, start: i64) {
    let signers: Vec<UserId> = document.signers.iter().map(|s| s.user).collect();
    for (i, signer) in signers.iter().enumerate() {
        record_signature(document, signer, start + i as i64).expect("slot is pending");
    }
}
