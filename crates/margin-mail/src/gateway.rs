//! [`MailIngestGateway`]: turns a signed relay webhook into a note mutation.
//!
//! Each message is handled in one pass: verify the signature, classify the
//! message, skip it if its `Message-Id` was already processed, resolve the
//! sender, then create or append.

use std::sync::Arc;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use margin_core::{
  directory::UserDirectory,
  document::{AppendText, Document, NewDocument},
  notify::{NotificationTask, TaskQueue},
  store::NoteStore,
};
use uuid::Uuid;

use crate::{
  error::Error,
  message::{CreationMessage, InboundMessage, UpdateMessage, WebhookForm},
  signature::SigningKey,
};

/// What a successfully authenticated message led to.
#[derive(Debug)]
pub enum Outcome {
  Created(Document),
  Appended(Document),
  /// The sender of a creation message is not a known account. Nothing was
  /// written; the relay is still told the message was handled.
  Rejected,
  /// The `Message-Id` was already processed into this document.
  Duplicate(Uuid),
}

impl IntoResponse for Outcome {
  fn into_response(self) -> Response {
    match self {
      Outcome::Rejected => (StatusCode::OK, "Rejected").into_response(),
      _ => (StatusCode::OK, "OK").into_response(),
    }
  }
}

pub struct MailIngestGateway<S, D> {
  store:       Arc<S>,
  directory:   Arc<D>,
  queue:       Arc<dyn TaskQueue>,
  signing_key: SigningKey,
}

impl<S, D> Clone for MailIngestGateway<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:       self.store.clone(),
      directory:   self.directory.clone(),
      queue:       self.queue.clone(),
      signing_key: self.signing_key.clone(),
    }
  }
}

impl<S, D> MailIngestGateway<S, D>
where
  S: NoteStore,
  D: UserDirectory,
{
  pub fn new(
    store: Arc<S>,
    directory: Arc<D>,
    queue: Arc<dyn TaskQueue>,
    signing_key: SigningKey,
  ) -> Self {
    Self { store, directory, queue, signing_key }
  }

  pub async fn ingest(&self, form: WebhookForm) -> Result<Outcome, Error> {
    if let Err(e) = self.signing_key.verify(
      &form.timestamp,
      &form.token,
      form.signature.as_deref(),
    ) {
      tracing::warn!(error = %e, from = %form.from, "inbound mail failed signature check");
      return Err(e.into());
    }

    let message_id = form
      .message_id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .map(str::to_owned);
    let message = InboundMessage::from(form);

    if let Some(id) = &message_id
      && let Some(document_id) =
        self.store.find_processed_message(id).await.map_err(Error::store)?
    {
      tracing::info!(message_id = %id, %document_id, "duplicate inbound mail ignored");
      return Ok(Outcome::Duplicate(document_id));
    }

    let owner_id = self
      .directory
      .resolve_email(message.sender_address())
      .await
      .map_err(Error::directory)?;

    match message {
      InboundMessage::Creation(m) => self.create(m, owner_id, message_id).await,
      InboundMessage::Update(m) => self.append(m, owner_id, message_id).await,
    }
  }

  async fn create(
    &self,
    m: CreationMessage,
    owner_id: Option<Uuid>,
    message_id: Option<String>,
  ) -> Result<Outcome, Error> {
    let Some(owner_id) = owner_id else {
      tracing::warn!(sender = %m.sender_address, "mail from unknown sender rejected");
      return Ok(Outcome::Rejected);
    };

    let input = NewDocument {
      owner_id,
      title: m.subject,
      body: m.body_text,
      source_address: Some(m.sender_address),
      message_id,
    };
    let doc = self.store.create_document(input).await.map_err(Error::store)?;

    self.queue.enqueue(NotificationTask::NoteCreated {
      document_id: doc.document_id,
      owner_id,
    });
    tracing::info!(document_id = %doc.document_id, %owner_id, "note created by mail");
    Ok(Outcome::Created(doc))
  }

  async fn append(
    &self,
    m: UpdateMessage,
    owner_id: Option<Uuid>,
    message_id: Option<String>,
  ) -> Result<Outcome, Error> {
    let Some(owner_id) = owner_id else {
      tracing::warn!(sender = %m.sender_address, "reply from unknown sender");
      return Err(Error::NotFound);
    };

    let document_id =
      Uuid::parse_str(&m.document_ref).map_err(|_| Error::NotFound)?;
    let input = AppendText {
      text:           m.body_text,
      source_address: Some(m.sender_address),
      message_id,
    };
    // Scoped to the sender's account: a note owned by anyone else reads as
    // missing.
    let doc = self
      .store
      .append_to_body(document_id, owner_id, input)
      .await
      .map_err(Error::store)?;

    tracing::info!(%document_id, "note appended by mail");
    Ok(Outcome::Appended(doc))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use margin_core::version::EventKind;
  use margin_store_sqlite::SqliteStore;
  use tokio::sync::mpsc::UnboundedReceiver;

  use crate::queue::ChannelQueue;

  const KEY: &str = "s3cr3t";

  struct Harness {
    store:   Arc<SqliteStore>,
    gateway: MailIngestGateway<SqliteStore, SqliteStore>,
    tasks:   UnboundedReceiver<NotificationTask>,
  }

  async fn harness() -> Harness {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (queue, tasks) = ChannelQueue::new();
    let gateway = MailIngestGateway::new(
      store.clone(),
      store.clone(),
      Arc::new(queue),
      SigningKey::new(KEY),
    );
    Harness { store, gateway, tasks }
  }

  fn signed(from: &str, recipient: &str, subject: &str, text: &str) -> WebhookForm {
    WebhookForm {
      subject: subject.into(),
      stripped_text: text.into(),
      from: from.into(),
      recipient: recipient.into(),
      signature: Some(SigningKey::new(KEY).sign("1000", "abc").unwrap()),
      timestamp: "1000".into(),
      token: "abc".into(),
      message_id: None,
    }
  }

  fn creation(from: &str) -> WebhookForm {
    signed(from, "new@mail.example.com", "Groceries", "milk, eggs")
  }

  #[tokio::test]
  async fn end_to_end_create() {
    let mut h = harness().await;
    let owner = Uuid::new_v4();
    h.store.link_email("john@example.com", owner).await.unwrap();

    let outcome = h
      .gateway
      .ingest(creation("John <john@example.com>"))
      .await
      .unwrap();
    let Outcome::Created(doc) = outcome else { panic!("expected Created") };

    assert_eq!(doc.owner_id, owner);
    assert_eq!(doc.title, "Groceries");
    assert_eq!(doc.body, "milk, eggs");
    assert_eq!(doc.source_address.as_deref(), Some("john@example.com"));

    let docs = h.store.list_documents(owner).await.unwrap();
    assert_eq!(docs.len(), 1);
    let versions = h.store.list_versions(doc.document_id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].event_kind, EventKind::Created);

    assert_eq!(
      h.tasks.recv().await,
      Some(NotificationTask::NoteCreated { document_id: doc.document_id, owner_id: owner })
    );
  }

  #[tokio::test]
  async fn unknown_sender_on_create_is_soft_rejected() {
    let mut h = harness().await;
    let owner = Uuid::new_v4();

    let outcome = h
      .gateway
      .ingest(creation("stranger@example.com"))
      .await
      .unwrap();
    assert!(matches!(outcome, Outcome::Rejected));
    assert!(h.store.list_documents(owner).await.unwrap().is_empty());
    assert!(h.tasks.try_recv().is_err());
  }

  #[tokio::test]
  async fn bad_signature_is_rejected_before_anything_else() {
    let h = harness().await;
    let owner = Uuid::new_v4();
    h.store.link_email("john@example.com", owner).await.unwrap();

    let mut form = creation("john@example.com");
    form.signature = Some("00".repeat(32));
    assert!(matches!(
      h.gateway.ingest(form).await,
      Err(Error::InvalidSignature(_))
    ));

    let mut form = creation("john@example.com");
    form.signature = None;
    assert!(matches!(
      h.gateway.ingest(form).await,
      Err(Error::InvalidSignature(_))
    ));

    assert!(h.store.list_documents(owner).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn reply_appends_to_note() {
    let h = harness().await;
    let owner = Uuid::new_v4();
    h.store.link_email("john@example.com", owner).await.unwrap();
    let Outcome::Created(doc) =
      h.gateway.ingest(creation("john@example.com")).await.unwrap()
    else {
      panic!("expected Created")
    };

    let reply = signed(
      "John <JOHN@example.com>",
      &format!("note-{}@mail.example.com", doc.document_id),
      "Re: Groceries",
      "  bread  ",
    );
    let Outcome::Appended(updated) = h.gateway.ingest(reply).await.unwrap() else {
      panic!("expected Appended")
    };
    assert_eq!(updated.body, "milk, eggs\n\nbread");
    assert_eq!(updated.title, "Groceries");

    let versions = h.store.list_versions(doc.document_id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].event_kind, EventKind::Appended);
    assert_eq!(versions[1].snapshot_body, "milk, eggs");
  }

  #[tokio::test]
  async fn reply_from_unknown_sender_is_not_found() {
    let h = harness().await;
    let owner = Uuid::new_v4();
    let doc = h
      .store
      .create_document(NewDocument::new(owner, "Log", "Hello"))
      .await
      .unwrap();

    let reply = signed(
      "stranger@example.com",
      &format!("note-{}@mail.example.com", doc.document_id),
      "",
      "World",
    );
    assert!(matches!(h.gateway.ingest(reply).await, Err(Error::NotFound)));
    assert_eq!(h.store.list_versions(doc.document_id).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn reply_to_another_owners_note_is_not_found() {
    let h = harness().await;
    let alice = Uuid::new_v4();
    let doc = h
      .store
      .create_document(NewDocument::new(alice, "Private", "secret"))
      .await
      .unwrap();
    h.store.link_email("mallory@example.com", Uuid::new_v4()).await.unwrap();

    let reply = signed(
      "mallory@example.com",
      &format!("note-{}@mail.example.com", doc.document_id),
      "",
      "injected",
    );
    assert!(matches!(h.gateway.ingest(reply).await, Err(Error::NotFound)));

    let current = h.store.get_document(doc.document_id).await.unwrap().unwrap();
    assert_eq!(current.body, "secret");
    assert_eq!(h.store.list_versions(doc.document_id).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn reply_to_missing_or_malformed_note_is_not_found() {
    let h = harness().await;
    h.store.link_email("john@example.com", Uuid::new_v4()).await.unwrap();

    for recipient in [
      "note-42@mail.example.com".to_string(),
      format!("note-{}@mail.example.com", Uuid::new_v4()),
    ] {
      let reply = signed("john@example.com", &recipient, "", "World");
      assert!(matches!(h.gateway.ingest(reply).await, Err(Error::NotFound)));
    }
  }

  #[tokio::test]
  async fn blank_subject_surfaces_validation_errors() {
    let h = harness().await;
    h.store.link_email("john@example.com", Uuid::new_v4()).await.unwrap();

    let form = signed("john@example.com", "new@mail.example.com", "  ", "text");
    let Err(Error::Validation(errors)) = h.gateway.ingest(form).await else {
      panic!("expected validation failure")
    };
    assert!(errors.field("title").is_some());
  }

  #[tokio::test]
  async fn redelivered_message_is_processed_once() {
    let mut h = harness().await;
    let owner = Uuid::new_v4();
    h.store.link_email("john@example.com", owner).await.unwrap();

    let mut form = creation("john@example.com");
    form.message_id = Some("<abc@relay>".into());

    let Outcome::Created(doc) = h.gateway.ingest(form.clone()).await.unwrap() else {
      panic!("expected Created")
    };
    let again = h.gateway.ingest(form).await.unwrap();
    assert!(matches!(again, Outcome::Duplicate(id) if id == doc.document_id));

    assert_eq!(h.store.list_documents(owner).await.unwrap().len(), 1);
    assert!(h.tasks.recv().await.is_some());
    assert!(h.tasks.try_recv().is_err());
  }
}
