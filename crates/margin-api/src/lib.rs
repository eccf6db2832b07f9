//! JSON REST API for Margin notes.
//!
//! Exposes an axum [`Router`] backed by any [`margin_core::store::NoteStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility: the router expects an authentication layer to insert a
//! [`Caller`] into each request's extensions.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", margin_api::api_router(store.clone()))
//! ```

pub mod caller;
pub mod error;
pub mod notes;
pub mod versions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use margin_core::store::NoteStore;

pub use caller::Caller;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: NoteStore + 'static,
{
  Router::new()
    .route("/notes", get(notes::list::<S>).post(notes::create::<S>))
    .route(
      "/notes/{id}",
      get(notes::get_one::<S>)
        .put(notes::update::<S>)
        .delete(notes::destroy::<S>),
    )
    .route("/notes/{id}/append", post(notes::append::<S>))
    .route("/notes/{id}/versions", get(versions::list::<S>))
    .route("/notes/{id}/versions/{seq}", get(versions::get_one::<S>))
    .with_state(store)
}
