//! [`SqliteStore`] — the SQLite implementation of [`NoteStore`] and
//! [`UserDirectory`].

use std::path::Path;

use margin_core::{
  append,
  directory::UserDirectory,
  document::{AppendText, Document, DocumentEdit, NewDocument},
  store::NoteStore,
  validate,
  version::{EventKind, VersionRecord},
};
use rusqlite::{
  Connection, OptionalExtension as _, TransactionBehavior, params,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    DOCUMENT_COLUMNS, RawDocument, RawVersion, decode_uuid, encode_dt,
    encode_uuid, now,
  },
  schema::SCHEMA,
  versions::{record_version, select_version, select_versions},
};

type CoreResult<T> = margin_core::Result<T>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Margin note store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Map `address` to `owner_id` in the identity table, replacing any
  /// previous mapping for the address.
  ///
  /// Account management owns this table; the method exists for seeding and
  /// tests.
  pub async fn link_email(&self, address: &str, owner_id: Uuid) -> Result<()> {
    let address = address.trim().to_owned();
    let owner_str = encode_uuid(owner_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_emails (email, owner_id) VALUES (?1, ?2)
           ON CONFLICT(email) DO UPDATE SET owner_id = excluded.owner_id",
          params![address, owner_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn select_document(
  conn: &Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawDocument>> {
  conn
    .query_row(
      &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = ?1"),
      params![id_str],
      RawDocument::from_row,
    )
    .optional()
}

/// Load a document for mutation, enforcing ownership.
fn select_owned_document(
  conn: &Connection,
  id: Uuid,
  owner_str: &str,
) -> rusqlite::Result<CoreResult<RawDocument>> {
  Ok(match select_document(conn, &encode_uuid(id))? {
    Some(raw) if raw.owner_id == owner_str => Ok(raw),
    _ => Err(margin_core::Error::DocumentNotFound(id)),
  })
}

fn record_processed_message(
  conn: &Connection,
  message_id: Option<&str>,
  document_id: &str,
  recorded_at: &str,
) -> rusqlite::Result<()> {
  if let Some(message_id) = message_id {
    conn.execute(
      "INSERT INTO processed_messages (message_id, document_id, recorded_at)
       VALUES (?1, ?2, ?3)",
      params![message_id, document_id, recorded_at],
    )?;
  }
  Ok(())
}

// ─── NoteStore impl ──────────────────────────────────────────────────────────

impl NoteStore for SqliteStore {
  type Error = crate::Error;

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn create_document(&self, input: NewDocument) -> Result<Document> {
    validate::validate_document(&input.title, &input.body)
      .map_err(margin_core::Error::from)?;

    let created_at = now();
    let document = Document {
      document_id: Uuid::new_v4(),
      owner_id: input.owner_id,
      title: input.title,
      body: input.body,
      source_address: input.source_address,
      public_share_id: None,
      created_at,
      updated_at: created_at,
    };

    let id_str         = encode_uuid(document.document_id);
    let owner_str      = encode_uuid(document.owner_id);
    let at_str         = encode_dt(created_at);
    let title          = document.title.clone();
    let body           = document.body.clone();
    let source_address = document.source_address.clone();
    let message_id     = input.message_id;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO documents (
             document_id, owner_id, title, body, source_address,
             public_share_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)",
          params![id_str, owner_str, title, body, source_address, at_str],
        )?;
        record_version(&tx, &id_str, &title, &body, EventKind::Created, &at_str)?;
        record_processed_message(&tx, message_id.as_deref(), &id_str, &at_str)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(document)
  }

  async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_document(conn, &id_str)?))
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn list_documents(&self, owner_id: Uuid) -> Result<Vec<Document>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DOCUMENT_COLUMNS} FROM documents
           WHERE owner_id = ?1
           ORDER BY updated_at DESC, created_at DESC"
        ))?;
        let rows = stmt
          .query_map(params![owner_str], RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn update_document(
    &self,
    id:       Uuid,
    owner_id: Uuid,
    edit:     DocumentEdit,
  ) -> Result<Document> {
    validate::validate_document(&edit.title, &edit.body)
      .map_err(margin_core::Error::from)?;

    let owner_str = encode_uuid(owner_id);
    let at_str    = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = match select_owned_document(&tx, id, &owner_str)? {
          Ok(raw) => raw,
          Err(e) => return Ok(Err(e)),
        };

        record_version(
          &tx,
          &current.document_id,
          &current.title,
          &current.body,
          EventKind::Updated,
          &at_str,
        )?;
        tx.execute(
          "UPDATE documents SET title = ?2, body = ?3, updated_at = ?4
           WHERE document_id = ?1",
          params![current.document_id, edit.title, edit.body, at_str],
        )?;
        tx.commit()?;

        Ok(Ok(RawDocument {
          title: edit.title,
          body: edit.body,
          updated_at: at_str,
          ..current
        }))
      })
      .await??;

    raw.into_document()
  }

  async fn append_to_body(
    &self,
    id:       Uuid,
    owner_id: Uuid,
    input:    AppendText,
  ) -> Result<Document> {
    validate::validate_append_text(&input.text)
      .map_err(margin_core::Error::from)?;

    let owner_str = encode_uuid(owner_id);
    let at_str    = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = match select_owned_document(&tx, id, &owner_str)? {
          Ok(raw) => raw,
          Err(e) => return Ok(Err(e)),
        };

        let merged = append::merge(&current.body, &input.text);
        if let Err(errors) = validate::validate_body(&merged) {
          return Ok(Err(errors.into()));
        }

        record_version(
          &tx,
          &current.document_id,
          &current.title,
          &current.body,
          EventKind::Appended,
          &at_str,
        )?;
        tx.execute(
          "UPDATE documents
           SET body = ?2,
               source_address = COALESCE(?3, source_address),
               updated_at = ?4
           WHERE document_id = ?1",
          params![current.document_id, merged, input.source_address, at_str],
        )?;
        record_processed_message(
          &tx,
          input.message_id.as_deref(),
          &current.document_id,
          &at_str,
        )?;
        tx.commit()?;

        Ok(Ok(RawDocument {
          body: merged,
          source_address: input.source_address.or(current.source_address.clone()),
          updated_at: at_str,
          ..current
        }))
      })
      .await??;

    raw.into_document()
  }

  async fn destroy_document(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE document_id = ?1 AND owner_id = ?2",
          params![id_str, owner_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(margin_core::Error::DocumentNotFound(id).into());
    }
    Ok(())
  }

  // ── Version log ───────────────────────────────────────────────────────────

  async fn list_versions(&self, document_id: Uuid) -> Result<Vec<VersionRecord>> {
    let id_str = encode_uuid(document_id);

    let raws: Vec<RawVersion> = self
      .conn
      .call(move |conn| Ok(select_versions(conn, &id_str)?))
      .await?;

    raws.into_iter().map(RawVersion::into_record).collect()
  }

  async fn get_version(
    &self,
    document_id:     Uuid,
    sequence_number: u32,
  ) -> Result<Option<VersionRecord>> {
    let id_str = encode_uuid(document_id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_version(conn, &id_str, sequence_number)?))
      .await?;

    raw.map(RawVersion::into_record).transpose()
  }

  // ── Inbound message ledger ────────────────────────────────────────────────

  async fn find_processed_message(&self, message_id: &str) -> Result<Option<Uuid>> {
    let message_id = message_id.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT document_id FROM processed_messages WHERE message_id = ?1",
            params![message_id],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.as_deref().map(decode_uuid).transpose()
  }
}

// ─── UserDirectory impl ──────────────────────────────────────────────────────

impl UserDirectory for SqliteStore {
  type Error = crate::Error;

  async fn resolve_email(&self, address: &str) -> Result<Option<Uuid>> {
    let address = address.trim().to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT owner_id FROM user_emails WHERE email = ?1",
            params![address],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.as_deref().map(decode_uuid).transpose()
  }
}
