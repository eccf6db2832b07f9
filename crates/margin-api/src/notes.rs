//! Handlers for `/notes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notes` | Caller's notes, most recently updated first |
//! | `POST`   | `/notes` | Body: `{"title":"...","body":"..."}`; returns 201 |
//! | `GET`    | `/notes/:id` | 404 if missing or owned by someone else |
//! | `PUT`    | `/notes/:id` | Body: `{"title":"...","body":"..."}` |
//! | `DELETE` | `/notes/:id` | 204; version history is kept |
//! | `POST`   | `/notes/:id/append` | Body: `{"body":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use margin_core::{
  document::{AppendText, Document, DocumentEdit, NewDocument},
  store::NoteStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

/// Fetch `id` if it exists and belongs to `caller`.
pub(crate) async fn owned_document<S: NoteStore>(
  store: &S,
  caller: Caller,
  id: Uuid,
) -> Result<Document, ApiError> {
  store
    .get_document(id)
    .await
    .map_err(ApiError::store)?
    .filter(|doc| doc.owner_id == caller.owner_id)
    .ok_or_else(|| ApiError::NotFound(format!("note {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /notes`
pub async fn list<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
) -> Result<Json<Vec<Document>>, ApiError> {
  let docs = store
    .list_documents(caller.owner_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(docs))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  pub title: String,
  #[serde(default)]
  pub body:  String,
}

/// `POST /notes` — returns 201 + the stored [`Document`].
pub async fn create<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ApiError> {
  let doc = store
    .create_document(NewDocument::new(caller.owner_id, body.title, body.body))
    .await
    .map_err(ApiError::store)?;
  tracing::info!(document_id = %doc.document_id, "created note");
  Ok((StatusCode::CREATED, Json(doc)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /notes/:id`
pub async fn get_one<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
  Ok(Json(owned_document(&*store, caller, id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /notes/:id` — replaces title and body.
pub async fn update<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<NoteBody>,
) -> Result<Json<Document>, ApiError> {
  let edit = DocumentEdit { title: body.title, body: body.body };
  let doc = store
    .update_document(id, caller.owner_id, edit)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(document_id = %id, "updated note");
  Ok(Json(doc))
}

// ─── Destroy ──────────────────────────────────────────────────────────────────

/// `DELETE /notes/:id`
pub async fn destroy<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store
    .destroy_document(id, caller.owner_id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(document_id = %id, "deleted note");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Append ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AppendBody {
  pub body: String,
}

/// `POST /notes/:id/append`
pub async fn append<S: NoteStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<AppendBody>,
) -> Result<Json<Document>, ApiError> {
  let doc = store
    .append_to_body(id, caller.owner_id, AppendText::new(body.body))
    .await
    .map_err(ApiError::store)?;
  tracing::info!(document_id = %id, "appended to note");
  Ok(Json(doc))
}
