//! Version records: the immutable history of every document mutation.
//!
//! A record is written exactly once, in the same transaction as the mutation
//! it describes, and never changes afterwards. Records outlive the document
//! they describe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// The kind of mutation a [`VersionRecord`] was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  /// Snapshot holds the state written at creation.
  Created,
  /// Snapshot holds the state before a whole title/body replacement.
  Updated,
  /// Snapshot holds the state before text was appended.
  Appended,
}

impl EventKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Appended => "appended",
    }
  }
}

/// One entry in a document's version log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
  pub document_id:     Uuid,
  /// Starts at 1 and increases by one per mutation of the document.
  pub sequence_number: u32,
  pub snapshot_title:  String,
  pub snapshot_body:   String,
  pub event_kind:      EventKind,
  pub recorded_at:     DateTime<Utc>,
}

/// A document's title and body as they stood after a given mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub document_id:     Uuid,
  pub sequence_number: u32,
  pub event_kind:      EventKind,
  pub recorded_at:     DateTime<Utc>,
  pub title:           String,
  pub body:            String,
}

/// Reconstruct the state that followed mutation `record`.
///
/// Records of updates and appends capture the state *before* their mutation,
/// so the state following `record` is found in the next record when there is
/// one, and in the live document otherwise. A creation record already holds
/// its own post-state. Returns `None` only when the state cannot be recovered:
/// `record` is the latest mutation and the document has since been destroyed.
pub fn reconstruct(
  record: &VersionRecord,
  next: Option<&VersionRecord>,
  current: Option<&Document>,
) -> Option<Snapshot> {
  let (title, body) = match (next, current) {
    (Some(next), _) => (next.snapshot_title.clone(), next.snapshot_body.clone()),
    (None, Some(doc)) => (doc.title.clone(), doc.body.clone()),
    (None, None) if record.event_kind == EventKind::Created => {
      (record.snapshot_title.clone(), record.snapshot_body.clone())
    }
    (None, None) => return None,
  };

  Some(Snapshot {
    document_id: record.document_id,
    sequence_number: record.sequence_number,
    event_kind: record.event_kind,
    recorded_at: record.recorded_at,
    title,
    body,
  })
}
