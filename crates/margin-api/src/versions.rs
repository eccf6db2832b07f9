//! Read-only handlers for a note's version history.
//!
//! `GET /notes/:id/versions/:seq` returns the note as it stood *after*
//! mutation `seq`; see [`margin_core::version::reconstruct`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use margin_core::{
  store::NoteStore,
  version::{Snapshot, reconstruct},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError, notes::owned_document};

#[derive(Debug, Serialize)]
pub struct VersionSummary {
  pub document_id:     Uuid,
  pub sequence_number: u32,
  pub recorded_at:     DateTime<Utc>,
}

/// `GET /notes/:id/versions` — oldest first.
pub async fn list<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<VersionSummary>>, ApiError> {
  owned_document(&*store, caller, id).await?;

  let versions = store.list_versions(id).await.map_err(ApiError::store)?;
  Ok(Json(
    versions
      .into_iter()
      .map(|v| VersionSummary {
        document_id:     v.document_id,
        sequence_number: v.sequence_number,
        recorded_at:     v.recorded_at,
      })
      .collect(),
  ))
}

/// `GET /notes/:id/versions/:seq`
pub async fn get_one<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((id, seq)): Path<(Uuid, u32)>,
) -> Result<Json<Snapshot>, ApiError> {
  let current = owned_document(&*store, caller, id).await?;
  let not_found = || {
    ApiError::from(&margin_core::Error::VersionNotFound {
      document_id:     id,
      sequence_number: seq,
    })
  };

  let record = store
    .get_version(id, seq)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;

  let next = match seq.checked_add(1) {
    Some(next_seq) => store
      .get_version(id, next_seq)
      .await
      .map_err(ApiError::store)?,
    None => None,
  };

  reconstruct(&record, next.as_ref(), Some(&current))
    .map(Json)
    .ok_or_else(not_found)
}
