//! Documents ("notes") and the inputs accepted by repository mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A short text document owned by a single account.
///
/// Documents are only ever changed through [`crate::store::NoteStore`]; every
/// change is paired with a [`crate::version::VersionRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub document_id:     Uuid,
  /// Fixed at creation.
  pub owner_id:        Uuid,
  pub title:           String,
  pub body:            String,
  /// The address that last created or updated this document by mail.
  pub source_address:  Option<String>,
  /// Opaque public share identifier; generated elsewhere.
  pub public_share_id: Option<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Input to [`crate::store::NoteStore::create_document`].
/// Identifiers and timestamps are always set by the store.
#[derive(Debug, Clone)]
pub struct NewDocument {
  pub owner_id:       Uuid,
  pub title:          String,
  pub body:           String,
  pub source_address: Option<String>,
  /// Inbound message identifier, recorded for idempotent mail delivery.
  pub message_id:     Option<String>,
}

impl NewDocument {
  /// Convenience constructor for a direct (non-mail) creation.
  pub fn new(
    owner_id: Uuid,
    title: impl Into<String>,
    body: impl Into<String>,
  ) -> Self {
    Self {
      owner_id,
      title: title.into(),
      body: body.into(),
      source_address: None,
      message_id: None,
    }
  }
}

/// Input to [`crate::store::NoteStore::update_document`]: the complete new
/// title and body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEdit {
  pub title: String,
  pub body:  String,
}

/// Input to [`crate::store::NoteStore::append_to_body`].
#[derive(Debug, Clone)]
pub struct AppendText {
  pub text:           String,
  pub source_address: Option<String>,
  pub message_id:     Option<String>,
}

impl AppendText {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), source_address: None, message_id: None }
  }
}
