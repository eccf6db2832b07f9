//! SQLite backend for the Margin note store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That thread owns the only connection,
//! so mutations are applied one at a time, each inside its own transaction.

mod encode;
mod schema;
mod store;
mod versions;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
