//! SQLite implementation of the RecordStore trait.
//!
//! The connection is wrapped in a mutex and every operation runs on the
//! blocking thread pool, so the async runtime is never parked on disk I/O.
//! Documents are written together with their signer rows in one
//! transaction; the revision column makes the write conditional.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use vellum_core::{
    ActivityKind, ActivityRecord, Document, DocumentId, DocumentStatus, Fingerprint, Role, Signer,
    SignerStatus, Template, TemplateId, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{RecordStore, UpdateOutcome};

const DOCUMENT_COLUMNS: &str = "id, title, template_id, content, status, created_by, \
     fingerprint, created_at, completed_at, revision";
const TEMPLATE_COLUMNS: &str = "id, name, description, fields, category, created_by, \
     active, created_at";
const USER_COLUMNS: &str = "id, username, email, role, created_at";
const ACTIVITY_COLUMNS: &str = "actor, action, document_id, detail, at";

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database at the given path and run migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database. Useful for tests.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        // journal_mode returns the resulting mode as a row
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        migration::migrate(&mut conn)?;
        tracing::debug!("sqlite store ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            op(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Runtime(format!("blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_document(&self, document: &Document) -> Result<()> {
        let document = document.clone();
        self.with_conn(move |conn| {
            let content = encode_cbor(&document.content, "document content")?;
            let tx = conn.transaction()?;

            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?1)",
                params![document.id.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            if exists {
                return Err(StoreError::DocumentExists(document.id));
            }

            tx.execute(
                "INSERT INTO documents (
                    id, title, template_id, content, status, created_by,
                    fingerprint, created_at, completed_at, revision
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    document.id.as_bytes().as_slice(),
                    &document.title,
                    document.template.as_bytes().as_slice(),
                    content,
                    document.status.as_str(),
                    document.created_by.as_bytes().as_slice(),
                    document.fingerprint.as_ref().map(|f| f.as_bytes().as_slice()),
                    document.created_at,
                    document.completed_at,
                    document.revision as i64,
                ],
            )?;

            insert_signers(&tx, &document.id, &document.signers)?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn document(&self, id: &DocumentId) -> Result<Option<Document>> {
        let id = *id;
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
                    params![id.as_bytes().as_slice()],
                    read_document_row,
                )
                .optional()?;

            match row {
                None => Ok(None),
                Some(row) => {
                    let signers = load_signers(conn, &id)?;
                    Ok(Some(hydrate_document(row, signers)?))
                }
            }
        })
        .await
    }

    async fn update_document(&self, document: &Document) -> Result<UpdateOutcome> {
        let document = document.clone();
        self.with_conn(move |conn| {
            let content = encode_cbor(&document.content, "document content")?;
            let tx = conn.transaction()?;

            let stored: Option<i64> = tx
                .query_row(
                    "SELECT revision FROM documents WHERE id = ?1",
                    params![document.id.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            let stored = match stored {
                None => return Ok(UpdateOutcome::Missing),
                Some(revision) => revision as u64,
            };
            if stored != document.revision {
                return Ok(UpdateOutcome::Stale { current: stored });
            }

            // created_by and created_at are deliberately absent: creation
            // provenance is immutable under update.
            let next = document.revision + 1;
            tx.execute(
                "UPDATE documents SET
                    title = ?2, template_id = ?3, content = ?4, status = ?5,
                    fingerprint = ?6, completed_at = ?7, revision = ?8
                WHERE id = ?1",
                params![
                    document.id.as_bytes().as_slice(),
                    &document.title,
                    document.template.as_bytes().as_slice(),
                    content,
                    document.status.as_str(),
                    document.fingerprint.as_ref().map(|f| f.as_bytes().as_slice()),
                    document.completed_at,
                    next as i64,
                ],
            )?;

            tx.execute(
                "DELETE FROM signers WHERE document_id = ?1",
                params![document.id.as_bytes().as_slice()],
            )?;
            insert_signers(&tx, &document.id, &document.signers)?;

            tx.commit()?;
            Ok(UpdateOutcome::Updated { revision: next })
        })
        .await
    }

    async fn documents_for(&self, user: &UserId) -> Result<Vec<Document>> {
        let user = *user;
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM documents
                 WHERE created_by = ?1
                    OR EXISTS (SELECT 1 FROM signers
                               WHERE signers.document_id = documents.id
                                 AND signers.user_id = ?1)
                 ORDER BY created_at DESC, id",
                DOCUMENT_COLUMNS
            );
            query_documents(conn, &sql, params![user.as_bytes().as_slice()])
        })
        .await
    }

    async fn count_documents_for(&self, user: &UserId) -> Result<u64> {
        let user = *user;
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents
                 WHERE created_by = ?1
                    OR EXISTS (SELECT 1 FROM signers
                               WHERE signers.document_id = documents.id
                                 AND signers.user_id = ?1)",
                params![user.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn pending_for(&self, user: &UserId) -> Result<Vec<Document>> {
        let user = *user;
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM documents
                 WHERE status != ?2
                   AND EXISTS (SELECT 1 FROM signers
                               WHERE signers.document_id = documents.id
                                 AND signers.user_id = ?1
                                 AND signers.status = ?3)
                 ORDER BY created_at DESC, id",
                DOCUMENT_COLUMNS
            );
            query_documents(
                conn,
                &sql,
                params![
                    user.as_bytes().as_slice(),
                    DocumentStatus::Signed.as_str(),
                    SignerStatus::Pending.as_str(),
                ],
            )
        })
        .await
    }

    async fn count_documents(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn count_documents_with_status(&self, status: DocumentStatus) -> Result<u64> {
        let status = status.as_str();
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE status = ?1",
                params![status],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Template Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_template(&self, template: &Template) -> Result<()> {
        let template = template.clone();
        self.with_conn(move |conn| {
            let fields = encode_cbor(&template.fields, "template fields")?;
            conn.execute(
                "INSERT INTO templates (
                    id, name, description, fields, category, created_by, active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    template.id.as_bytes().as_slice(),
                    &template.name,
                    &template.description,
                    fields,
                    &template.category,
                    template.created_by.as_bytes().as_slice(),
                    template.active,
                    template.created_at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn template(&self, id: &TemplateId) -> Result<Option<Template>> {
        let id = *id;
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM templates WHERE id = ?1", TEMPLATE_COLUMNS),
                    params![id.as_bytes().as_slice()],
                    read_template_row,
                )
                .optional()?;
            row.map(hydrate_template).transpose()
        })
        .await
    }

    async fn active_templates(&self) -> Result<Vec<Template>> {
        self.with_conn(|conn| {
            let rows = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM templates WHERE active = 1
                     ORDER BY created_at DESC, id",
                    TEMPLATE_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], read_template_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            rows.into_iter().map(hydrate_template).collect()
        })
        .await
    }

    async fn update_template(&self, template: &Template) -> Result<bool> {
        let template = template.clone();
        self.with_conn(move |conn| {
            let fields = encode_cbor(&template.fields, "template fields")?;
            let changed = conn.execute(
                "UPDATE templates SET
                    name = ?2, description = ?3, fields = ?4, category = ?5, active = ?6
                WHERE id = ?1",
                params![
                    template.id.as_bytes().as_slice(),
                    &template.name,
                    &template.description,
                    fields,
                    &template.category,
                    template.active,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn count_templates(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM templates WHERE active = 1",
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let id_taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                params![user.id.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            if id_taken {
                return Err(StoreError::UserExists(user.id));
            }

            let email_taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
                params![&user.email],
                |row| row.get(0),
            )?;
            if email_taken {
                return Err(StoreError::EmailTaken(user.email.clone()));
            }

            tx.execute(
                "INSERT INTO users (id, username, email, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.as_bytes().as_slice(),
                    &user.username,
                    &user.email,
                    user.role.as_str(),
                    user.created_at,
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn user(&self, id: &UserId) -> Result<Option<User>> {
        let id = *id;
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                    params![id.as_bytes().as_slice()],
                    read_user_row,
                )
                .optional()?;
            row.map(hydrate_user).transpose()
        })
        .await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_owned();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                    params![email],
                    read_user_row,
                )
                .optional()?;
            row.map(hydrate_user).transpose()
        })
        .await
    }

    async fn find_user_with_role(&self, role: Role) -> Result<Option<User>> {
        let role = role.as_str();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM users WHERE role = ?1
                         ORDER BY created_at ASC, id LIMIT 1",
                        USER_COLUMNS
                    ),
                    params![role],
                    read_user_row,
                )
                .optional()?;
            row.map(hydrate_user).transpose()
        })
        .await
    }

    async fn set_user_role(&self, id: &UserId, role: Role) -> Result<bool> {
        let id = *id;
        let role = role.as_str();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?2 WHERE id = ?1",
                params![id.as_bytes().as_slice(), role],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>> {
        self.with_conn(move |conn| {
            let rows = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM users ORDER BY username ASC, id LIMIT ?1 OFFSET ?2",
                    USER_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![limit as i64, offset as i64], read_user_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            rows.into_iter().map(hydrate_user).collect()
        })
        .await
    }

    async fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activity Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn append_activity(&self, record: &ActivityRecord) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO activity_log (actor, action, document_id, detail, at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.actor.as_bytes().as_slice(),
                    record.action.as_str(),
                    record.document.as_ref().map(|id| id.as_bytes().as_slice()),
                    &record.detail,
                    record.at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_activity(&self, limit: u64) -> Result<Vec<ActivityRecord>> {
        self.with_conn(move |conn| {
            let rows = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM activity_log ORDER BY at DESC, id DESC LIMIT ?1",
                    ACTIVITY_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![limit as i64], read_activity_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            rows.into_iter().map(hydrate_activity).collect()
        })
        .await
    }

    async fn activity_for(&self, user: &UserId, limit: u64) -> Result<Vec<ActivityRecord>> {
        let user = *user;
        self.with_conn(move |conn| {
            let rows = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM activity_log WHERE actor = ?1
                     ORDER BY at DESC, id DESC LIMIT ?2",
                    ACTIVITY_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(
                        params![user.as_bytes().as_slice(), limit as i64],
                        read_activity_row,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            rows.into_iter().map(hydrate_activity).collect()
        })
        .await
    }

    async fn count_activity_for(&self, user: &UserId) -> Result<u64> {
        let user = *user;
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM activity_log WHERE actor = ?1",
                params![user.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
//
// Reading happens in two steps: a plain-typed row struct comes out of
// rusqlite, then hydration turns raw bytes and status strings back into
// domain types. Only the second step can fail with a decoding error.
// ─────────────────────────────────────────────────────────────────────────────

struct DocumentRow {
    id: Vec<u8>,
    title: String,
    template_id: Vec<u8>,
    content: Vec<u8>,
    status: String,
    created_by: Vec<u8>,
    fingerprint: Option<Vec<u8>>,
    created_at: i64,
    completed_at: Option<i64>,
    revision: i64,
}

fn read_document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get(0)?,
        title: row.get(1)?,
        template_id: row.get(2)?,
        content: row.get(3)?,
        status: row.get(4)?,
        created_by: row.get(5)?,
        fingerprint: row.get(6)?,
        created_at: row.get(7)?,
        completed_at: row.get(8)?,
        revision: row.get(9)?,
    })
}

fn hydrate_document(row: DocumentRow, signers: Vec<Signer>) -> Result<Document> {
    Ok(Document {
        id: parse_document_id(&row.id)?,
        title: row.title,
        template: parse_template_id(&row.template_id)?,
        content: decode_cbor(&row.content, "document content")?,
        status: DocumentStatus::parse(&row.status).map_err(decoding)?,
        created_by: parse_user_id(&row.created_by)?,
        signers,
        fingerprint: row.fingerprint.as_deref().map(parse_fingerprint).transpose()?,
        created_at: row.created_at,
        completed_at: row.completed_at,
        revision: row.revision as u64,
    })
}

struct SignerRow {
    user_id: Vec<u8>,
    status: String,
    signed_at: Option<i64>,
    signature: Option<Vec<u8>>,
    notes: Option<String>,
    added_at: Option<i64>,
    added_by: Option<Vec<u8>>,
}

fn read_signer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SignerRow> {
    Ok(SignerRow {
        user_id: row.get(0)?,
        status: row.get(1)?,
        signed_at: row.get(2)?,
        signature: row.get(3)?,
        notes: row.get(4)?,
        added_at: row.get(5)?,
        added_by: row.get(6)?,
    })
}

fn hydrate_signer(row: SignerRow) -> Result<Signer> {
    Ok(Signer {
        user: parse_user_id(&row.user_id)?,
        status: SignerStatus::parse(&row.status).map_err(decoding)?,
        signed_at: row.signed_at,
        signature: row.signature.as_deref().map(parse_fingerprint).transpose()?,
        notes: row.notes,
        added_at: row.added_at,
        added_by: row.added_by.as_deref().map(parse_user_id).transpose()?,
    })
}

struct TemplateRow {
    id: Vec<u8>,
    name: String,
    description: String,
    fields: Vec<u8>,
    category: String,
    created_by: Vec<u8>,
    active: bool,
    created_at: i64,
}

fn read_template_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        fields: row.get(3)?,
        category: row.get(4)?,
        created_by: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn hydrate_template(row: TemplateRow) -> Result<Template> {
    Ok(Template {
        id: parse_template_id(&row.id)?,
        name: row.name,
        description: row.description,
        fields: decode_cbor(&row.fields, "template fields")?,
        category: row.category,
        created_by: parse_user_id(&row.created_by)?,
        active: row.active,
        created_at: row.created_at,
    })
}

struct UserRow {
    id: Vec<u8>,
    username: String,
    email: String,
    role: String,
    created_at: i64,
}

fn read_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn hydrate_user(row: UserRow) -> Result<User> {
    Ok(User {
        id: parse_user_id(&row.id)?,
        username: row.username,
        email: row.email,
        role: Role::parse(&row.role).map_err(decoding)?,
        created_at: row.created_at,
    })
}

struct ActivityRow {
    actor: Vec<u8>,
    action: String,
    document_id: Option<Vec<u8>>,
    detail: String,
    at: i64,
}

fn read_activity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
    Ok(ActivityRow {
        actor: row.get(0)?,
        action: row.get(1)?,
        document_id: row.get(2)?,
        detail: row.get(3)?,
        at: row.get(4)?,
    })
}

fn hydrate_activity(row: ActivityRow) -> Result<ActivityRecord> {
    Ok(ActivityRecord {
        actor: parse_user_id(&row.actor)?,
        action: ActivityKind::parse(&row.action).map_err(decoding)?,
        document: row.document_id.as_deref().map(parse_document_id).transpose()?,
        detail: row.detail,
        at: row.at,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Run a document query and hydrate each hit with its signer rows.
fn query_documents<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Document>> {
    let rows = {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, read_document_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };

    let mut documents = Vec::with_capacity(rows.len());
    for row in rows {
        let id = parse_document_id(&row.id)?;
        let signers = load_signers(conn, &id)?;
        documents.push(hydrate_document(row, signers)?);
    }
    Ok(documents)
}

fn load_signers(conn: &Connection, id: &DocumentId) -> Result<Vec<Signer>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, status, signed_at, signature, notes, added_at, added_by
         FROM signers WHERE document_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map(params![id.as_bytes().as_slice()], read_signer_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(hydrate_signer).collect()
}

fn insert_signers(tx: &Transaction<'_>, id: &DocumentId, signers: &[Signer]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO signers (
            document_id, position, user_id, status, signed_at,
            signature, notes, added_at, added_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for (position, signer) in signers.iter().enumerate() {
        stmt.execute(params![
            id.as_bytes().as_slice(),
            position as i64,
            signer.user.as_bytes().as_slice(),
            signer.status.as_str(),
            signer.signed_at,
            signer.signature.as_ref().map(|s| s.as_bytes().as_slice()),
            &signer.notes,
            signer.added_at,
            signer.added_by.as_ref().map(|u| u.as_bytes().as_slice()),
        ])?;
    }
    Ok(())
}

fn encode_cbor<T: serde::Serialize>(value: &T, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| StoreError::Encoding(format!("{}: {}", what, e)))?;
    Ok(buf)
}

fn decode_cbor<T: serde::de::DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Decoding(format!("{}: {}", what, e)))
}

fn decoding<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Decoding(err.to_string())
}

fn parse_document_id(bytes: &[u8]) -> Result<DocumentId> {
    DocumentId::try_from(bytes)
        .map_err(|_| StoreError::Decoding("document id must be 16 bytes".into()))
}

fn parse_template_id(bytes: &[u8]) -> Result<TemplateId> {
    TemplateId::try_from(bytes)
        .map_err(|_| StoreError::Decoding("template id must be 16 bytes".into()))
}

fn parse_user_id(bytes: &[u8]) -> Result<UserId> {
    UserId::try_from(bytes).map_err(|_| StoreError::Decoding("user id must be 16 bytes".into()))
}

fn parse_fingerprint(bytes: &[u8]) -> Result<Fingerprint> {
    Fingerprint::try_from(bytes)
        .map_err(|_| StoreError::Decoding("fingerprint must be 32 bytes".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::{Content, FieldKind, FieldValue, TemplateField};

    fn sample_doc(title: &str, created_at: i64) -> Document {
        Document {
            id: DocumentId::generate(),
            title: title.into(),
            template: TemplateId::generate(),
            content: Content::new(),
            status: DocumentStatus::Pending,
            created_by: UserId::generate(),
            signers: vec![],
            fingerprint: None,
            created_at,
            completed_at: None,
            revision: 0,
        }
    }

    fn rich_doc() -> Document {
        let creator = UserId::generate();
        let alice = UserId::generate();
        let bob = UserId::generate();

        let mut content = Content::new();
        content.insert("amount".into(), FieldValue::Number(1200));
        content.insert("client".into(), FieldValue::Text("Acme".into()));
        content.insert("effective".into(), FieldValue::Date(1_700_000_000_000));
        content.insert("renews".into(), FieldValue::Bool(true));

        let mut signed = Signer::listed(alice);
        signed.status = SignerStatus::Signed;
        signed.signed_at = Some(200);
        signed.signature = Some(Fingerprint::from_bytes([7; 32]));

        let mut declined = Signer::invited(bob, creator, 150);
        declined.status = SignerStatus::Rejected;
        declined.signed_at = Some(250);
        declined.notes = Some("wrong amount".into());

        Document {
            id: DocumentId::generate(),
            title: "Service Agreement".into(),
            template: TemplateId::generate(),
            content,
            status: DocumentStatus::Pending,
            created_by: creator,
            signers: vec![signed, declined],
            fingerprint: Some(Fingerprint::from_bytes([9; 32])),
            created_at: 100,
            completed_at: None,
            revision: 0,
        }
    }

    fn sample_template(name: &str, created_at: i64) -> Template {
        Template {
            id: TemplateId::generate(),
            name: name.into(),
            description: "standard engagement".into(),
            fields: vec![
                TemplateField {
                    name: "client".into(),
                    kind: FieldKind::Text,
                    required: true,
                    label: "Client".into(),
                },
                TemplateField {
                    name: "amount".into(),
                    kind: FieldKind::Number,
                    required: false,
                    label: "Amount".into(),
                },
            ],
            category: "contracts".into(),
            created_by: UserId::generate(),
            active: true,
            created_at,
        }
    }

    fn sample_user(username: &str, email: &str, created_at: i64) -> User {
        User {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            role: Role::Member,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        let doc = rich_doc();

        store.insert_document(&doc).await.unwrap();
        let fetched = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched, doc);
    }

    #[tokio::test]
    async fn test_insert_duplicate_document_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let doc = sample_doc("NDA", 100);

        store.insert_document(&doc).await.unwrap();
        let err = store.insert_document(&doc).await.unwrap_err();
        assert!(matches!(err, StoreError::DocumentExists(id) if id == doc.id));
    }

    #[tokio::test]
    async fn test_conditional_update_replaces_signers() {
        let store = SqliteStore::open_memory().unwrap();
        let mut doc = rich_doc();
        store.insert_document(&doc).await.unwrap();

        doc.signers.push(Signer::listed(UserId::generate()));
        doc.status = DocumentStatus::Signed;
        doc.completed_at = Some(500);

        let outcome = store.update_document(&doc).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated { revision: 1 });

        let fetched = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.signers.len(), 3);
        assert_eq!(fetched.status, DocumentStatus::Signed);
        assert_eq!(fetched.completed_at, Some(500));
        assert_eq!(fetched.revision, 1);
    }

    #[tokio::test]
    async fn test_stale_update_leaves_record_untouched() {
        let store = SqliteStore::open_memory().unwrap();
        let mut doc = sample_doc("NDA", 100);
        store.insert_document(&doc).await.unwrap();

        doc.title = "NDA v2".into();
        assert_eq!(
            store.update_document(&doc).await.unwrap(),
            UpdateOutcome::Updated { revision: 1 }
        );

        // Still carries revision 0, so this write must lose.
        doc.title = "NDA v3".into();
        assert_eq!(
            store.update_document(&doc).await.unwrap(),
            UpdateOutcome::Stale { current: 1 }
        );

        let stored = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "NDA v2");
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = SqliteStore::open_memory().unwrap();
        let doc = sample_doc("NDA", 100);
        assert_eq!(
            store.update_document(&doc).await.unwrap(),
            UpdateOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_update_preserves_creation_provenance() {
        let store = SqliteStore::open_memory().unwrap();
        let doc = sample_doc("NDA", 100);
        store.insert_document(&doc).await.unwrap();

        let mut tampered = doc.clone();
        tampered.created_by = UserId::generate();
        tampered.created_at = 999;
        store.update_document(&tampered).await.unwrap();

        let stored = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.created_by, doc.created_by);
        assert_eq!(stored.created_at, 100);
    }

    #[tokio::test]
    async fn test_documents_for_covers_creator_and_signer() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = UserId::generate();
        let bob = UserId::generate();

        let mut created = sample_doc("by alice", 10);
        created.created_by = alice;

        let mut signing = sample_doc("for alice", 20);
        signing.created_by = bob;
        signing.signers.push(Signer::listed(alice));

        let unrelated = sample_doc("unrelated", 30);

        store.insert_document(&created).await.unwrap();
        store.insert_document(&signing).await.unwrap();
        store.insert_document(&unrelated).await.unwrap();

        let docs = store.documents_for(&alice).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, signing.id);
        assert_eq!(docs[1].id, created.id);

        assert_eq!(store.count_documents_for(&alice).await.unwrap(), 2);
        assert_eq!(store.count_documents_for(&bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pending_for_excludes_signed_documents() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = UserId::generate();

        let mut waiting = sample_doc("waiting", 10);
        waiting.signers.push(Signer::listed(alice));

        let mut completed = sample_doc("completed", 20);
        completed.status = DocumentStatus::Signed;
        completed.signers.push(Signer::listed(alice));

        let mut signed_slot = sample_doc("already signed", 30);
        let mut slot = Signer::listed(alice);
        slot.status = SignerStatus::Signed;
        signed_slot.signers.push(slot);

        store.insert_document(&waiting).await.unwrap();
        store.insert_document(&completed).await.unwrap();
        store.insert_document(&signed_slot).await.unwrap();

        let pending = store.pending_for(&alice).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, waiting.id);
    }

    #[tokio::test]
    async fn test_count_documents_with_status() {
        let store = SqliteStore::open_memory().unwrap();
        let mut done = sample_doc("done", 10);
        done.status = DocumentStatus::Signed;

        store.insert_document(&done).await.unwrap();
        store.insert_document(&sample_doc("open", 20)).await.unwrap();

        assert_eq!(store.count_documents().await.unwrap(), 2);
        assert_eq!(
            store
                .count_documents_with_status(DocumentStatus::Signed)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .count_documents_with_status(DocumentStatus::Draft)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_template_round_trip_and_retire() {
        let store = SqliteStore::open_memory().unwrap();
        let mut template = sample_template("Engagement", 100);

        store.insert_template(&template).await.unwrap();
        let fetched = store.template(&template.id).await.unwrap().unwrap();
        assert_eq!(fetched, template);
        assert_eq!(store.count_templates().await.unwrap(), 1);

        template.active = false;
        assert!(store.update_template(&template).await.unwrap());

        // Retired templates stay resolvable but drop out of listings.
        assert!(store.template(&template.id).await.unwrap().is_some());
        assert!(store.active_templates().await.unwrap().is_empty());
        assert_eq!(store.count_templates().await.unwrap(), 0);

        let unknown = sample_template("ghost", 200);
        assert!(!store.update_template(&unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_email_unique() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = sample_user("alice", "alice@example.com", 1);

        store.insert_user(&alice).await.unwrap();

        let err = store.insert_user(&alice).await.unwrap_err();
        assert!(matches!(err, StoreError::UserExists(_)));

        let rival = sample_user("imposter", "alice@example.com", 2);
        let err = store.insert_user(&rival).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));

        let found = store
            .user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, alice.id);
    }

    #[tokio::test]
    async fn test_find_user_with_role_prefers_earliest() {
        let store = SqliteStore::open_memory().unwrap();

        let mut late = sample_user("late", "late@example.com", 20);
        late.role = Role::Admin;
        let mut early = sample_user("early", "early@example.com", 10);
        early.role = Role::Admin;

        store.insert_user(&late).await.unwrap();
        store.insert_user(&early).await.unwrap();

        let found = store.find_user_with_role(Role::Admin).await.unwrap();
        assert_eq!(found.unwrap().id, early.id);
    }

    #[tokio::test]
    async fn test_set_user_role() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = sample_user("alice", "alice@example.com", 1);
        store.insert_user(&alice).await.unwrap();

        assert!(store.set_user_role(&alice.id, Role::Admin).await.unwrap());
        let stored = store.user(&alice.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);

        assert!(!store
            .set_user_role(&UserId::generate(), Role::Admin)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_users_pages_alphabetically() {
        let store = SqliteStore::open_memory().unwrap();
        for (name, email) in [
            ("carol", "carol@example.com"),
            ("alice", "alice@example.com"),
            ("bob", "bob@example.com"),
        ] {
            store.insert_user(&sample_user(name, email, 1)).await.unwrap();
        }

        let page = store.list_users(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].username, "alice");
        assert_eq!(page[1].username, "bob");

        let rest = store.list_users(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].username, "carol");

        assert_eq!(store.count_users().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_activity_ordering_and_filter() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = UserId::generate();
        let bob = UserId::generate();
        let doc = DocumentId::generate();

        for (actor, at) in [(alice, 10), (bob, 30), (alice, 20)] {
            store
                .append_activity(&ActivityRecord {
                    actor,
                    action: ActivityKind::DocumentSigned,
                    document: Some(doc),
                    detail: format!("at {}", at),
                    at,
                })
                .await
                .unwrap();
        }

        let recent = store.recent_activity(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].at, 30);
        assert_eq!(recent[1].at, 20);
        assert_eq!(recent[0].document, Some(doc));

        let for_alice = store.activity_for(&alice, 10).await.unwrap();
        assert_eq!(for_alice.len(), 2);
        assert_eq!(for_alice[0].at, 20);
        assert_eq!(store.count_activity_for(&alice).await.unwrap(), 2);
        assert_eq!(store.count_activity_for(&bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopen_persists_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");

        let doc = rich_doc();
        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_document(&doc).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let fetched = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched, doc);
    }
}
