//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use margin_core::{store::StoreError, validate::ValidationErrors};
use thiserror::Error;

use crate::signature::SignatureError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("invalid signature: {0}")]
  InvalidSignature(#[from] SignatureError),
  #[error("not found")]
  NotFound,
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("directory error: {0}")]
  Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Classify a backend error, surfacing domain failures with their own
  /// status codes.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.as_core() {
      Some(core) if core.is_not_found() => Error::NotFound,
      Some(margin_core::Error::Validation(errors)) => {
        Error::Validation(errors.clone())
      }
      _ => Error::Store(Box::new(e)),
    }
  }

  pub fn directory<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Error::Directory(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"margin\""),
        );
        res
      }
      Error::InvalidSignature(_) => {
        (StatusCode::UNPROCESSABLE_ENTITY, "Invalid Signature").into_response()
      }
      Error::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
      Error::Validation(errors) => {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
      }
      Error::Store(e) | Error::Directory(e) => {
        tracing::error!(error = %e, "inbound mail failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}
