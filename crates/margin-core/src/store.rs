//! The `NoteStore` trait: the note repository and its version log.
//!
//! The trait is implemented by storage backends (e.g. `margin-store-sqlite`).
//! Higher layers (`margin-api`, `margin-mail`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  document::{AppendText, Document, DocumentEdit, NewDocument},
  version::VersionRecord,
};

/// Backend errors that may wrap a domain [`crate::Error`].
///
/// HTTP layers use this to tell "not found" and validation failures apart
/// from genuine storage faults.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn as_core(&self) -> Option<&crate::Error>;
}

/// Abstraction over a Margin note store backend.
///
/// Every mutation writes exactly one [`VersionRecord`] and applies its state
/// change atomically with it: either both are durable or neither is.
/// Mutations of the same document never interleave.
///
/// Version records are append-only; no method updates or deletes them.
pub trait NoteStore: Send + Sync {
  type Error: StoreError;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Validate and persist a new document, recording a `Created` version that
  /// holds the title and body just written.
  fn create_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Retrieve a document by id regardless of owner. `None` if not found.
  fn get_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// List the documents of `owner_id`, most recently updated first.
  fn list_documents(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;

  /// Replace the title and body, recording an `Updated` version that holds
  /// the previous title and body.
  ///
  /// Fails with [`crate::Error::DocumentNotFound`] when the document does not
  /// exist or is not owned by `owner_id`.
  fn update_document(
    &self,
    id: Uuid,
    owner_id: Uuid,
    edit: DocumentEdit,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Merge `input.text` onto the body with [`crate::append::merge`],
  /// recording an `Appended` version that holds the previous state.
  fn append_to_body(
    &self,
    id: Uuid,
    owner_id: Uuid,
    input: AppendText,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Delete a document. Its version records are kept.
  fn destroy_document(
    &self,
    id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Version log ───────────────────────────────────────────────────────

  /// All version records of a document, oldest first.
  fn list_versions(
    &self,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Vec<VersionRecord>, Self::Error>> + Send + '_;

  /// A single version record, or `None` if there is no such sequence number.
  fn get_version(
    &self,
    document_id: Uuid,
    sequence_number: u32,
  ) -> impl Future<Output = Result<Option<VersionRecord>, Self::Error>> + Send + '_;

  // ── Inbound message ledger ────────────────────────────────────────────

  /// The document an already-processed inbound message produced, if any.
  fn find_processed_message<'a>(
    &'a self,
    message_id: &'a str,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + 'a;
}
