//! The Vault: unified API for the Vellum system.
//!
//! The Vault brings together the domain model, the signature state
//! machine, storage, and post-commit collaborators into a cohesive
//! interface for building applications.

use std::sync::Arc;

use vellum_core::{
    canonical, fingerprint::DOCUMENT_DOMAIN, validate_new_document, validate_new_template,
    validate_new_user, ActivityKind, ActivityRecord, Content, Document, DocumentId,
    DocumentStatus, Fingerprint, Role, Signer, Template, TemplateField, TemplateId, User, UserId,
};
use vellum_lifecycle::{add_signer, initial_status, record_signature, ShareOutcome, SignOutcome};
use vellum_outbox::{Notice, Outbox};
use vellum_store::{RecordStore, StoreExt, UpdateOutcome};

use crate::error::{Result, VaultError};

/// Configuration for the Vault.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// How many conditional-update attempts a mutation makes before
    /// reporting contention.
    pub max_update_attempts: u32,
    /// How many activity entries the admin overview includes.
    pub recent_activity_limit: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_update_attempts: 8,
            recent_activity_limit: 5,
        }
    }
}

/// Caller-supplied fields for a new document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    /// The template this document instantiates. Must resolve.
    pub template: TemplateId,
    pub content: Content,
    /// Signers listed at creation, in slot order. May be empty; the ids
    /// are not required to resolve in the directory.
    pub signers: Vec<UserId>,
}

/// Caller-supplied fields for a new template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub fields: Vec<TemplateField>,
    pub category: String,
}

/// Caller-supplied fields for a new directory user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// The main Vault struct.
///
/// Provides a unified API for:
/// - Creating, signing, and sharing documents
/// - Verifying stored documents against their creation fingerprint
/// - Managing templates and the user directory
/// - Admin overviews over the activity trail
pub struct Vault<S: RecordStore> {
    /// The storage backend.
    store: Arc<S>,
    /// Post-commit collaborators: notices, audit trail, anchoring.
    outbox: Outbox,
    /// Configuration.
    config: VaultConfig,
}

impl<S: RecordStore> Vault<S> {
    /// Create a new vault instance.
    pub fn new(store: S, outbox: Outbox, config: VaultConfig) -> Self {
        Self {
            store: Arc::new(store),
            outbox,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new document, fingerprinted at creation.
    ///
    /// The template must resolve. Signer ids need not: the aggregate
    /// records references, and the directory is consulted only when
    /// delivering signing requests.
    pub async fn create_document(&self, actor: &UserId, params: NewDocument) -> Result<Document> {
        validate_new_document(&params.title, &params.signers)?;

        if self.store.template(&params.template).await?.is_none() {
            return Err(VaultError::TemplateNotFound(params.template));
        }

        let now = now_millis();
        let preimage = canonical::creation_preimage(&params.title, &params.content, now);
        let fingerprint = Fingerprint::digest(DOCUMENT_DOMAIN, &preimage);

        let status = initial_status(params.signers.len());
        let signers: Vec<Signer> = params.signers.into_iter().map(Signer::listed).collect();

        let document = Document {
            id: DocumentId::generate(),
            title: params.title,
            template: params.template,
            content: params.content,
            status,
            created_by: *actor,
            signers,
            fingerprint: Some(fingerprint),
            created_at: now,
            completed_at: None,
            revision: 0,
        };

        self.store.insert_document(&document).await?;

        tracing::info!(
            document = %document.id,
            actor = %actor,
            signers = document.signers.len(),
            "document created"
        );

        let requests = self.signing_requests(&document, actor).await;
        let record = document_activity(*actor, ActivityKind::DocumentCreated, &document);
        self.outbox
            .document_created(&record, requests, &document.id, document.fingerprint.as_ref())
            .await;

        Ok(document)
    }

    /// Get a document by id, with its integrity verdict.
    ///
    /// `verified` recomputes the creation digest from the stored fields,
    /// stored `created_at` included. A missing fingerprint reads as
    /// unverified, never as an error.
    pub async fn document(&self, id: &DocumentId) -> Result<VerifiedDocument> {
        let document = self
            .store
            .document(id)
            .await?
            .ok_or(VaultError::DocumentNotFound(*id))?;

        let verified = verify_creation(&document);
        Ok(VerifiedDocument { document, verified })
    }

    /// All documents `user` created or holds a signer slot in, newest first.
    pub async fn documents_for(&self, user: &UserId) -> Result<Vec<Document>> {
        Ok(self.store.documents_for(user).await?)
    }

    /// Documents awaiting `user`'s signature, newest first.
    ///
    /// Excludes documents that already completed: a pending slot on a
    /// signed document is not an open request.
    pub async fn pending_signatures(&self, user: &UserId) -> Result<Vec<Document>> {
        Ok(self.store.pending_for(user).await?)
    }

    /// Whether the document's creation fingerprint is registered with the
    /// anchor.
    ///
    /// A missing fingerprint or an unreachable anchor reads as `false`;
    /// side-channel availability never fails the read.
    pub async fn anchored(&self, id: &DocumentId) -> Result<bool> {
        let document = self
            .store
            .document(id)
            .await?
            .ok_or(VaultError::DocumentNotFound(*id))?;

        match document.fingerprint {
            Some(fingerprint) => Ok(self.outbox.is_anchored(&fingerprint).await),
            None => Ok(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signing and Sharing Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record `actor`'s signature on document `id`.
    ///
    /// Runs the signature state machine inside a conditional-update loop:
    /// a losing writer re-reads and re-derives its decision from fresh
    /// state. Two concurrent first-time signers both land, in some serial
    /// order; a repeat sign fails with [`VaultError::AlreadySigned`]
    /// whichever write commits first.
    pub async fn sign_document(&self, actor: &UserId, id: &DocumentId) -> Result<SignReceipt> {
        let mut attempts = 0;
        loop {
            let mut document = self
                .store
                .document(id)
                .await?
                .ok_or(VaultError::DocumentNotFound(*id))?;

            let outcome = record_signature(&mut document, actor, now_millis())?;

            match self.store.update_document(&document).await? {
                UpdateOutcome::Updated { revision } => {
                    document.revision = revision;

                    tracing::info!(
                        document = %document.id,
                        actor = %actor,
                        completed = outcome.completed,
                        "signature recorded"
                    );

                    self.after_sign(&document, actor, outcome).await;

                    return Ok(SignReceipt {
                        document,
                        completed: outcome.completed,
                        signed_at: outcome.signed_at,
                    });
                }
                UpdateOutcome::Missing => return Err(VaultError::DocumentNotFound(*id)),
                UpdateOutcome::Stale { current } => {
                    attempts += 1;
                    if attempts >= self.config.max_update_attempts {
                        return Err(VaultError::Contention { document: *id });
                    }
                    tracing::debug!(
                        document = %id,
                        attempt = attempts,
                        current,
                        "conditional update lost, retrying against fresh state"
                    );
                }
            }
        }
    }

    /// Add `user` as a pending signer on document `id`.
    ///
    /// Creator-only. The invited user must resolve in the directory,
    /// since the point of a share is the signing request that follows.
    /// Re-sharing to a user who already holds a slot is a no-op success:
    /// the current document is returned and nothing is written.
    pub async fn share_document(
        &self,
        actor: &UserId,
        id: &DocumentId,
        user: &UserId,
    ) -> Result<Document> {
        let invited = self
            .store
            .user(user)
            .await?
            .ok_or(VaultError::UserNotFound(*user))?;

        let mut attempts = 0;
        loop {
            let mut document = self
                .store
                .document(id)
                .await?
                .ok_or(VaultError::DocumentNotFound(*id))?;

            match add_signer(&mut document, actor, user, now_millis())? {
                ShareOutcome::AlreadyPresent => return Ok(document),
                ShareOutcome::Added => {}
            }

            match self.store.update_document(&document).await? {
                UpdateOutcome::Updated { revision } => {
                    document.revision = revision;

                    tracing::info!(
                        document = %document.id,
                        actor = %actor,
                        invited = %user,
                        "document shared"
                    );

                    let record =
                        document_activity(*actor, ActivityKind::DocumentShared, &document);
                    let request = match self.resolve_user(actor).await {
                        Some(requester) => {
                            Some(Notice::signing_requested(&invited, &document, &requester))
                        }
                        None => {
                            tracing::warn!(
                                document = %document.id,
                                actor = %actor,
                                "requester not in directory, skipping signing request"
                            );
                            None
                        }
                    };
                    self.outbox.signer_invited(&record, request).await;

                    return Ok(document);
                }
                UpdateOutcome::Missing => return Err(VaultError::DocumentNotFound(*id)),
                UpdateOutcome::Stale { current } => {
                    attempts += 1;
                    if attempts >= self.config.max_update_attempts {
                        return Err(VaultError::Contention { document: *id });
                    }
                    tracing::debug!(
                        document = %id,
                        attempt = attempts,
                        current,
                        "conditional update lost, retrying against fresh state"
                    );
                }
            }
        }
    }

    /// Post-commit side effects of a landed signature.
    async fn after_sign(&self, document: &Document, actor: &UserId, outcome: SignOutcome) {
        let record = document_activity(*actor, ActivityKind::DocumentSigned, document);
        let confirmation = match self.resolve_user(actor).await {
            Some(signer) => Some(Notice::signature_confirmed(&signer, document)),
            None => {
                tracing::warn!(
                    document = %document.id,
                    signer = %actor,
                    "signer not in directory, skipping confirmation"
                );
                None
            }
        };
        self.outbox.signature_recorded(&record, confirmation).await;

        if outcome.completed {
            let notice = match self.resolve_user(&document.created_by).await {
                Some(creator) => Some(Notice::document_completed(&creator, document)),
                None => {
                    tracing::warn!(
                        document = %document.id,
                        creator = %document.created_by,
                        "creator not in directory, skipping completion notice"
                    );
                    None
                }
            };
            self.outbox
                .document_completed(notice, &document.id, document.fingerprint.as_ref())
                .await;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Template Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a reusable document template.
    pub async fn create_template(&self, actor: &UserId, params: NewTemplate) -> Result<Template> {
        validate_new_template(&params.name, &params.fields)?;

        let template = Template {
            id: TemplateId::generate(),
            name: params.name,
            description: params.description,
            fields: params.fields,
            category: params.category,
            created_by: *actor,
            active: true,
            created_at: now_millis(),
        };

        self.store.insert_template(&template).await?;

        tracing::info!(template = %template.id, actor = %actor, "template created");

        self.outbox
            .activity(&named_activity(
                *actor,
                ActivityKind::TemplateCreated,
                &template.name,
            ))
            .await;

        Ok(template)
    }

    /// Get a template by id, retired ones included.
    ///
    /// Retired templates stay resolvable so the documents referencing
    /// them keep rendering.
    pub async fn template(&self, id: &TemplateId) -> Result<Template> {
        self.store
            .template(id)
            .await?
            .ok_or(VaultError::TemplateNotFound(*id))
    }

    /// All active templates, newest first.
    pub async fn templates(&self) -> Result<Vec<Template>> {
        Ok(self.store.active_templates().await?)
    }

    /// Replace a template record.
    pub async fn update_template(&self, actor: &UserId, template: Template) -> Result<Template> {
        validate_new_template(&template.name, &template.fields)?;

        if !self.store.update_template(&template).await? {
            return Err(VaultError::TemplateNotFound(template.id));
        }

        tracing::info!(template = %template.id, actor = %actor, "template updated");

        self.outbox
            .activity(&named_activity(
                *actor,
                ActivityKind::TemplateUpdated,
                &template.name,
            ))
            .await;

        Ok(template)
    }

    /// Retire a template: it stops appearing in listings but stays
    /// resolvable by id.
    pub async fn retire_template(&self, actor: &UserId, id: &TemplateId) -> Result<Template> {
        let mut template = self
            .store
            .template(id)
            .await?
            .ok_or(VaultError::TemplateNotFound(*id))?;

        template.active = false;
        if !self.store.update_template(&template).await? {
            return Err(VaultError::TemplateNotFound(*id));
        }

        tracing::info!(template = %template.id, actor = %actor, "template retired");

        self.outbox
            .activity(&named_activity(
                *actor,
                ActivityKind::TemplateRetired,
                &template.name,
            ))
            .await;

        Ok(template)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Directory Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a directory user.
    ///
    /// Emails are normalized to lowercase on write, and [`Vault::seed_admin`]
    /// and the store's uniqueness check see the normalized form, so case
    /// variants of one address cannot take two slots.
    pub async fn register_user(&self, params: NewUser) -> Result<User> {
        validate_new_user(&params.username, &params.email)?;

        let user = User {
            id: UserId::generate(),
            username: params.username,
            email: params.email.to_lowercase(),
            role: params.role,
            created_at: now_millis(),
        };

        self.store.insert_user(&user).await?;

        tracing::info!(user = %user.id, role = %user.role, "user registered");

        self.outbox
            .activity(&named_activity(
                user.id,
                ActivityKind::UserRegistered,
                &user.username,
            ))
            .await;

        Ok(user)
    }

    /// Bootstrap the first admin account.
    ///
    /// Advisory-exclusive: probes for an existing admin and only inserts
    /// when none is found. Racing seeders can both pass the probe; the
    /// operation is meant for a single-operator setup path, not for
    /// concurrent use. The role on `params` is ignored; the account is
    /// always an admin.
    pub async fn seed_admin(&self, params: NewUser) -> Result<SeedOutcome> {
        if let Some(existing) = self.store.find_user_with_role(Role::Admin).await? {
            return Ok(SeedOutcome::AlreadyPresent(existing.id));
        }

        validate_new_user(&params.username, &params.email)?;

        let user = User {
            id: UserId::generate(),
            username: params.username,
            email: params.email.to_lowercase(),
            role: Role::Admin,
            created_at: now_millis(),
        };

        self.store.insert_user(&user).await?;

        tracing::info!(user = %user.id, "admin seeded");

        self.outbox
            .activity(&named_activity(
                user.id,
                ActivityKind::AdminSeeded,
                &user.username,
            ))
            .await;

        Ok(SeedOutcome::Created(user))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Change a user's directory role. Admin-only.
    pub async fn set_role(&self, actor: &UserId, user: &UserId, role: Role) -> Result<User> {
        self.require_admin(actor).await?;

        if !self.store.set_user_role(user, role).await? {
            return Err(VaultError::UserNotFound(*user));
        }

        let updated = self
            .store
            .user(user)
            .await?
            .ok_or(VaultError::UserNotFound(*user))?;

        tracing::info!(user = %user, role = %role, actor = %actor, "role updated");

        self.outbox
            .activity(&named_activity(
                *actor,
                ActivityKind::RoleUpdated,
                &format!("{} -> {}", updated.username, role),
            ))
            .await;

        Ok(updated)
    }

    /// Aggregate totals and recent activity for the admin overview.
    pub async fn admin_stats(&self, actor: &UserId) -> Result<VaultStats> {
        self.require_admin(actor).await?;

        let stats = self.store.stats().await?;
        let pending = self
            .store
            .count_documents_with_status(DocumentStatus::Pending)
            .await?;
        let recent_activity = self
            .store
            .recent_activity(self.config.recent_activity_limit)
            .await?;

        Ok(VaultStats {
            users: stats.users,
            documents: stats.documents,
            templates: stats.templates,
            signed_documents: stats.completed,
            pending_documents: pending,
            recent_activity,
        })
    }

    /// One page of the directory with per-user usage counters. Admin-only.
    ///
    /// Pages are 1-based; page 0 reads as page 1.
    pub async fn admin_users(&self, actor: &UserId, page: u64, per_page: u64) -> Result<UserPage> {
        self.require_admin(actor).await?;

        let page = page.max(1);
        let offset = (page - 1).saturating_mul(per_page);
        let listed = self.store.list_users(offset, per_page).await?;
        let total = self.store.count_users().await?;

        let mut users = Vec::with_capacity(listed.len());
        for user in listed {
            let documents = self.store.count_documents_for(&user.id).await?;
            let activity = self.store.count_activity_for(&user.id).await?;
            users.push(UserSummary {
                user,
                documents,
                activity,
            });
        }

        Ok(UserPage {
            users,
            total,
            page,
            per_page,
        })
    }

    /// The newest activity entries recorded for `user`. Admin-only.
    pub async fn user_activity(
        &self,
        actor: &UserId,
        user: &UserId,
        limit: u64,
    ) -> Result<Vec<ActivityRecord>> {
        self.require_admin(actor).await?;
        Ok(self.store.activity_for(user, limit).await?)
    }

    /// Resolve `actor` and require the admin role.
    ///
    /// An unknown actor reads as not authorized rather than not found;
    /// this path never reveals directory membership.
    async fn require_admin(&self, actor: &UserId) -> Result<User> {
        match self.store.user(actor).await? {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(VaultError::NotAuthorized("admin role required")),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recipient Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Signing-request notices for the signer slots of `document`.
    ///
    /// Recipients that do not resolve in the directory are skipped with a
    /// warning. Delivery is best-effort and never blocks the operation.
    async fn signing_requests(&self, document: &Document, requested_by: &UserId) -> Vec<Notice> {
        let requester = match self.resolve_user(requested_by).await {
            Some(requester) => requester,
            None => {
                tracing::warn!(
                    document = %document.id,
                    actor = %requested_by,
                    "requester not in directory, skipping signing requests"
                );
                return Vec::new();
            }
        };

        let mut requests = Vec::new();
        for slot in &document.signers {
            match self.resolve_user(&slot.user).await {
                Some(recipient) => {
                    requests.push(Notice::signing_requested(&recipient, document, &requester));
                }
                None => {
                    tracing::warn!(
                        document = %document.id,
                        signer = %slot.user,
                        "signer not in directory, skipping signing request"
                    );
                }
            }
        }
        requests
    }

    /// Directory lookup that never fails the surrounding operation.
    async fn resolve_user(&self, id: &UserId) -> Option<User> {
        match self.store.user(id).await {
            Ok(found) => found,
            Err(error) => {
                tracing::warn!(user = %id, %error, "directory lookup failed");
                None
            }
        }
    }
}

/// A stored document with its integrity verdict.
#[derive(Debug, Clone)]
pub struct VerifiedDocument {
    pub document: Document,
    /// Whether the stored fields still match the creation fingerprint.
    /// `false` for tampered records and for records with no fingerprint.
    pub verified: bool,
}

/// Result of a successful sign.
#[derive(Debug, Clone)]
pub struct SignReceipt {
    /// The document as stored after the signature landed.
    pub document: Document,
    /// Whether this signature completed the document.
    pub completed: bool,
    /// The instant recorded on the signer slot (Unix ms).
    pub signed_at: i64,
}

/// Result of an admin bootstrap attempt.
#[derive(Debug, Clone)]
pub enum SeedOutcome {
    /// No admin existed; this account was created.
    Created(User),
    /// An admin already exists; nothing was written.
    AlreadyPresent(UserId),
}

/// Aggregate overview for the admin dashboard.
#[derive(Debug, Clone)]
pub struct VaultStats {
    pub users: u64,
    pub documents: u64,
    pub templates: u64,
    pub signed_documents: u64,
    pub pending_documents: u64,
    /// Newest activity entries, newest first.
    pub recent_activity: Vec<ActivityRecord>,
}

/// One directory user with usage counters.
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub user: User,
    /// Documents this user created or holds a signer slot in.
    pub documents: u64,
    /// Activity entries recorded for this user.
    pub activity: u64,
}

/// One page of the directory.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<UserSummary>,
    /// Total directory size, for page-count arithmetic.
    pub total: u64,
    /// The 1-based page this covers.
    pub page: u64,
    pub per_page: u64,
}

/// Recompute the creation digest from stored fields and compare.
///
/// Uses the stored `created_at`: recomputing against a current timestamp
/// would fail every intact document ever written.
fn verify_creation(document: &Document) -> bool {
    match document.fingerprint {
        Some(stored) => {
            let preimage = canonical::creation_preimage(
                &document.title,
                &document.content,
                document.created_at,
            );
            Fingerprint::digest(DOCUMENT_DOMAIN, &preimage) == stored
        }
        None => false,
    }
}

/// An activity entry about a document, titled after it.
fn document_activity(actor: UserId, action: ActivityKind, document: &Document) -> ActivityRecord {
    ActivityRecord {
        actor,
        action,
        document: Some(document.id),
        detail: document.title.clone(),
        at: now_millis(),
    }
}

/// An activity entry with no document, described by `detail`.
fn named_activity(actor: UserId, action: ActivityKind, detail: &str) -> ActivityRecord {
    ActivityRecord {
        actor,
        action,
        document: None,
        detail: detail.to_owned(),
        at: now_millis(),
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
