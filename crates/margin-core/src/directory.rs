//! The `UserDirectory` trait: email address → account lookup.
//!
//! Account management lives outside this system; the directory is a read-only
//! collaborator from the core's point of view.

use std::future::Future;

use uuid::Uuid;

pub trait UserDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve `address` to the owning account, or `None` if it is unknown.
  /// Addresses compare case-insensitively.
  fn resolve_email<'a>(
    &'a self,
    address: &'a str,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + 'a;
}
