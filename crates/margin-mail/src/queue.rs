//! In-process notification queue.
//!
//! Tasks go onto an unbounded channel so enqueueing never waits; whoever
//! holds the receiver hands them to the delivery system.

use margin_core::notify::{NotificationTask, TaskQueue};
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct ChannelQueue {
  tx: mpsc::UnboundedSender<NotificationTask>,
}

impl ChannelQueue {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<NotificationTask>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl TaskQueue for ChannelQueue {
  fn enqueue(&self, task: NotificationTask) {
    if let Err(e) = self.tx.send(task) {
      tracing::warn!(task = ?e.0, "notification queue closed; task dropped");
    }
  }
}

/// Drain `rx`, handing each task off to delivery.
pub async fn run_worker(mut rx: mpsc::UnboundedReceiver<NotificationTask>) {
  while let Some(task) = rx.recv().await {
    match task {
      NotificationTask::NoteCreated { document_id, owner_id } => {
        tracing::info!(%document_id, %owner_id, "note-created notification dispatched");
      }
    }
  }
}
