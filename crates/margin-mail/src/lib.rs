//! Inbound-mail gateway and HTTP server for Margin.
//!
//! Exposes an axum [`Router`] that accepts signed relay webhooks at
//! `POST /mail/inbound` and mounts the direct JSON API under `/api` behind
//! HTTP Basic auth.

pub mod address;
pub mod auth;
pub mod error;
pub mod gateway;
pub mod message;
pub mod queue;
pub mod signature;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Form, Router,
  extract::State,
  middleware,
  routing::post,
};
use margin_core::{directory::UserDirectory, store::NoteStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use auth::{AuthConfig, require_basic_auth};
use gateway::{MailIngestGateway, Outcome};
use message::WebhookForm;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MARGIN_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Shared secret the mail relay signs webhooks with.
  pub mail_signing_key:   String,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Account that direct API requests act as.
  pub owner_id:           Uuid,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<S, D> {
  pub store:   Arc<S>,
  pub gateway: MailIngestGateway<S, D>,
  pub auth:    Arc<AuthConfig>,
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      gateway: self.gateway.clone(),
      auth:    self.auth.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<S, D>(state: AppState<S, D>) -> Router
where
  S: NoteStore + 'static,
  D: UserDirectory + 'static,
{
  let api = margin_api::api_router(state.store.clone()).layer(
    middleware::from_fn_with_state(state.auth.clone(), require_basic_auth),
  );

  Router::new()
    .route("/mail/inbound", post(inbound::<S, D>))
    .with_state(state.gateway)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn inbound<S, D>(
  State(gateway): State<MailIngestGateway<S, D>>,
  Form(form): Form<WebhookForm>,
) -> Result<Outcome, Error>
where
  S: NoteStore + 'static,
  D: UserDirectory + 'static,
{
  gateway.ingest(form).await
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use margin_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use crate::{auth::tests::{basic, hash}, queue::ChannelQueue, signature::SigningKey};

  const KEY: &str = "s3cr3t";

  async fn make_state() -> (AppState<SqliteStore, SqliteStore>, Uuid) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let owner = Uuid::new_v4();
    store.link_email("john@example.com", owner).await.unwrap();
    let (queue, _rx) = ChannelQueue::new();

    let state = AppState {
      store:   store.clone(),
      gateway: MailIngestGateway::new(
        store.clone(),
        store,
        Arc::new(queue),
        SigningKey::new(KEY),
      ),
      auth:    Arc::new(AuthConfig {
        username:      "user".to_string(),
        password_hash: hash("secret"),
        owner_id:      owner,
      }),
    };
    (state, owner)
  }

  fn form_body(fields: &[(&str, &str)]) -> String {
    fields
      .iter()
      .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
      .collect::<Vec<_>>()
      .join("&")
  }

  fn webhook(from: &str, recipient: &str, subject: &str, text: &str) -> String {
    let signature = SigningKey::new(KEY).sign("1000", "abc").unwrap();
    form_body(&[
      ("subject", subject),
      ("stripped-text", text),
      ("from", from),
      ("recipient", recipient),
      ("timestamp", "1000"),
      ("token", "abc"),
      ("signature", &signature),
    ])
  }

  async fn post_webhook(state: AppState<SqliteStore, SqliteStore>, body: String) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri("/mail/inbound")
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(body))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  async fn api_get(
    state: AppState<SqliteStore, SqliteStore>,
    uri: &str,
    auth: Option<&str>,
  ) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    router(state).oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
  }

  // ── Webhook ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn webhook_creates_note() {
    let (state, owner) = make_state().await;
    let body = webhook(
      "John <john@example.com>",
      "new@mail.example.com",
      "Groceries",
      "milk, eggs",
    );
    let resp = post_webhook(state.clone(), body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "OK");

    let docs = state.store.list_documents(owner).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Groceries");
  }

  #[tokio::test]
  async fn webhook_with_bad_signature_is_422() {
    let (state, owner) = make_state().await;
    let body = form_body(&[
      ("subject", "Groceries"),
      ("stripped-text", "milk"),
      ("from", "john@example.com"),
      ("recipient", "new@mail.example.com"),
      ("timestamp", "1000"),
      ("token", "abc"),
      ("signature", "deadbeef"),
    ]);
    let resp = post_webhook(state.clone(), body).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(text(resp).await, "Invalid Signature");
    assert!(state.store.list_documents(owner).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn webhook_from_unknown_sender_is_rejected_softly() {
    let (state, _) = make_state().await;
    let body = webhook("nobody@example.com", "new@mail.example.com", "Hi", "there");
    let resp = post_webhook(state, body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "Rejected");
  }

  #[tokio::test]
  async fn webhook_reply_to_missing_note_is_404() {
    let (state, _) = make_state().await;
    let recipient = format!("note-{}@mail.example.com", Uuid::new_v4());
    let body = webhook("john@example.com", &recipient, "", "more");
    let resp = post_webhook(state, body).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(text(resp).await, "Not Found");
  }

  #[tokio::test]
  async fn webhook_validation_failure_is_422_with_fields() {
    let (state, _) = make_state().await;
    let body = webhook("john@example.com", "new@mail.example.com", "", "text");
    let resp = post_webhook(state, body).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let value: Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(value, serde_json::json!({ "title": ["can't be blank"] }));
  }

  // ── API auth ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn api_requires_basic_auth() {
    let (state, _) = make_state().await;
    let resp = api_get(state, "/api/notes", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn api_rejects_wrong_password() {
    let (state, _) = make_state().await;
    let auth = basic("user", "wrong");
    let resp = api_get(state, "/api/notes", Some(&auth)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn api_sees_notes_created_by_mail() {
    let (state, _) = make_state().await;
    let body = webhook("john@example.com", "new@mail.example.com", "Groceries", "milk");
    post_webhook(state.clone(), body).await;

    let auth = basic("user", "secret");
    let resp = api_get(state, "/api/notes", Some(&auth)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let value: Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["title"], "Groceries");
    assert_eq!(value[0]["source_address"], "john@example.com");
  }
}
