//! The authenticated account a request acts on behalf of.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Inserted into request extensions by the authentication layer in front of
/// the API router. Handlers scope every read and write to `owner_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
  pub owner_id: Uuid,
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Caller>()
      .copied()
      .ok_or(ApiError::Unauthorized)
  }
}
