//! Domain types and storage traits for Margin notes.
//!
//! Documents, their version log, the append merge policy, and field
//! validation live here, alongside the traits that backends implement. No
//! HTTP or database code.

pub mod append;
pub mod directory;
pub mod document;
pub mod error;
pub mod notify;
pub mod store;
pub mod validate;
pub mod version;

pub use error::{Error, Result};
