//! Error types for `margin-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  #[error("version {sequence_number} of document {document_id} not found")]
  VersionNotFound {
    document_id:     Uuid,
    sequence_number: u32,
  },

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationErrors),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::DocumentNotFound(_) | Self::VersionNotFound { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
