//! The version log: append-only writes and ordered reads.
//!
//! [`record_version`] is called with the open transaction of the mutation it
//! describes, so the record and the state change commit or roll back together.

use margin_core::version::EventKind;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::{RawVersion, VERSION_COLUMNS};

/// Allocate the next sequence number for `document_id` and insert a record.
///
/// Returns the sequence number written.
pub fn record_version(
  conn: &Connection,
  document_id: &str,
  prior_title: &str,
  prior_body: &str,
  kind: EventKind,
  recorded_at: &str,
) -> rusqlite::Result<u32> {
  let sequence_number: u32 = conn.query_row(
    "SELECT COALESCE(MAX(sequence_number), 0) + 1 FROM versions
     WHERE document_id = ?1",
    params![document_id],
    |row| row.get(0),
  )?;

  conn.execute(
    "INSERT INTO versions (
       document_id, sequence_number, snapshot_title, snapshot_body,
       event_kind, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      document_id,
      sequence_number,
      prior_title,
      prior_body,
      kind.as_str(),
      recorded_at,
    ],
  )?;

  Ok(sequence_number)
}

pub fn select_versions(
  conn: &Connection,
  document_id: &str,
) -> rusqlite::Result<Vec<RawVersion>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {VERSION_COLUMNS} FROM versions
     WHERE document_id = ?1
     ORDER BY sequence_number ASC"
  ))?;
  stmt
    .query_map(params![document_id], RawVersion::from_row)?
    .collect()
}

pub fn select_version(
  conn: &Connection,
  document_id: &str,
  sequence_number: u32,
) -> rusqlite::Result<Option<RawVersion>> {
  conn
    .query_row(
      &format!(
        "SELECT {VERSION_COLUMNS} FROM versions
         WHERE document_id = ?1 AND sequence_number = ?2"
      ),
      params![document_id, sequence_number],
      RawVersion::from_row,
    )
    .optional()
}
