//! The inbound webhook payload and its classification into create or append.

use serde::Deserialize;

use crate::address::{note_reference, parse_sender};

/// Form fields posted by the mail relay. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookForm {
  #[serde(default)]
  pub subject:       String,
  /// Plain-text body with quoted reply content already removed.
  #[serde(rename = "stripped-text", default)]
  pub stripped_text: String,
  #[serde(default)]
  pub from:          String,
  #[serde(default)]
  pub recipient:     String,
  pub signature:     Option<String>,
  #[serde(default)]
  pub timestamp:     String,
  #[serde(default)]
  pub token:         String,
  #[serde(rename = "Message-Id")]
  pub message_id:    Option<String>,
}

/// A message asking for a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationMessage {
  pub subject:        String,
  pub body_text:      String,
  pub sender_address: String,
}

/// A reply to a note's address, asking to append to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMessage {
  /// Identifier taken from the `note-<id>` recipient local part.
  pub document_ref:   String,
  pub body_text:      String,
  pub sender_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
  Creation(CreationMessage),
  Update(UpdateMessage),
}

impl InboundMessage {
  pub fn sender_address(&self) -> &str {
    match self {
      Self::Creation(m) => &m.sender_address,
      Self::Update(m) => &m.sender_address,
    }
  }
}

impl From<WebhookForm> for InboundMessage {
  fn from(form: WebhookForm) -> Self {
    let sender_address = parse_sender(&form.from).trim().to_owned();
    match note_reference(&form.recipient) {
      Some(reference) => Self::Update(UpdateMessage {
        document_ref: reference.to_owned(),
        body_text: form.stripped_text,
        sender_address,
      }),
      None => Self::Creation(CreationMessage {
        subject: form.subject,
        body_text: form.stripped_text,
        sender_address,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(recipient: &str) -> WebhookForm {
    WebhookForm {
      subject: "Groceries".into(),
      stripped_text: "milk, eggs".into(),
      from: "John <john@example.com>".into(),
      recipient: recipient.into(),
      ..WebhookForm::default()
    }
  }

  #[test]
  fn plain_recipient_is_creation() {
    let message = InboundMessage::from(form("new@mail.example.com"));
    assert_eq!(
      message,
      InboundMessage::Creation(CreationMessage {
        subject:        "Groceries".into(),
        body_text:      "milk, eggs".into(),
        sender_address: "john@example.com".into(),
      })
    );
  }

  #[test]
  fn note_recipient_is_update() {
    let message = InboundMessage::from(form("note-42@mail.example.com"));
    assert_eq!(
      message,
      InboundMessage::Update(UpdateMessage {
        document_ref:   "42".into(),
        body_text:      "milk, eggs".into(),
        sender_address: "john@example.com".into(),
      })
    );
    assert_eq!(message.sender_address(), "john@example.com");
  }
}
