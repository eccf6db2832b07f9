//! Best-effort notification tasks.
//!
//! Delivery happens elsewhere. Submitting a task never blocks and never fails
//! the operation that produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum NotificationTask {
  /// A document was created from an inbound message.
  NoteCreated { document_id: Uuid, owner_id: Uuid },
}

/// A fire-and-forget queue of [`NotificationTask`]s.
pub trait TaskQueue: Send + Sync {
  fn enqueue(&self, task: NotificationTask);
}
