//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width so
//! that lexical order matches chronological order. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use margin_core::{
  document::Document,
  version::{EventKind, VersionRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── EventKind ───────────────────────────────────────────────────────────────

pub fn decode_event_kind(s: &str) -> Result<EventKind> {
  match s {
    "created" => Ok(EventKind::Created),
    "updated" => Ok(EventKind::Updated),
    "appended" => Ok(EventKind::Appended),
    other => Err(Error::UnknownEventKind(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const DOCUMENT_COLUMNS: &str = "document_id, owner_id, title, body, \
                                    source_address, public_share_id, \
                                    created_at, updated_at";

/// Raw strings read directly from a `documents` row.
#[derive(Debug, Clone)]
pub struct RawDocument {
  pub document_id:     String,
  pub owner_id:        String,
  pub title:           String,
  pub body:            String,
  pub source_address:  Option<String>,
  pub public_share_id: Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawDocument {
  /// Map a row selected with [`DOCUMENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:     row.get(0)?,
      owner_id:        row.get(1)?,
      title:           row.get(2)?,
      body:            row.get(3)?,
      source_address:  row.get(4)?,
      public_share_id: row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      document_id:     decode_uuid(&self.document_id)?,
      owner_id:        decode_uuid(&self.owner_id)?,
      title:           self.title,
      body:            self.body,
      source_address:  self.source_address,
      public_share_id: self.public_share_id,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

pub const VERSION_COLUMNS: &str = "document_id, sequence_number, \
                                   snapshot_title, snapshot_body, \
                                   event_kind, recorded_at";

/// Raw values read directly from a `versions` row.
#[derive(Debug, Clone)]
pub struct RawVersion {
  pub document_id:     String,
  pub sequence_number: u32,
  pub snapshot_title:  String,
  pub snapshot_body:   String,
  pub event_kind:      String,
  pub recorded_at:     String,
}

impl RawVersion {
  /// Map a row selected with [`VERSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:     row.get(0)?,
      sequence_number: row.get(1)?,
      snapshot_title:  row.get(2)?,
      snapshot_body:   row.get(3)?,
      event_kind:      row.get(4)?,
      recorded_at:     row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<VersionRecord> {
    Ok(VersionRecord {
      document_id:     decode_uuid(&self.document_id)?,
      sequence_number: self.sequence_number,
      snapshot_title:  self.snapshot_title,
      snapshot_body:   self.snapshot_body,
      event_kind:      decode_event_kind(&self.event_kind)?,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}
