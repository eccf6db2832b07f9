//! Field constraints for document titles and bodies.
//!
//! Errors are collected per field rather than failing on the first problem so
//! callers can report everything at once, in the shape
//! `{ "title": ["can't be blank"], "body": ["is too long ..."] }`.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Maximum body length, in characters.
pub const MAX_BODY_CHARS: usize = 65_536;

/// A set of per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
  fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self
      .fields
      .entry(field.to_owned())
      .or_default()
      .push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }

  /// Messages recorded against `field`, if any.
  pub fn field(&self, field: &str) -> Option<&[String]> {
    self.fields.get(field).map(Vec::as_slice)
  }

  /// `Ok(())` when no messages were recorded, otherwise `Err(self)`.
  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.fields {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{field} {message}")?;
        first = false;
      }
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

fn check_title(title: &str, errors: &mut ValidationErrors) {
  if title.trim().is_empty() {
    errors.add("title", "can't be blank");
  }
  if title.chars().count() > MAX_TITLE_CHARS {
    errors.add(
      "title",
      format!("is too long (maximum is {MAX_TITLE_CHARS} characters)"),
    );
  }
}

fn check_body(body: &str, errors: &mut ValidationErrors) {
  if body.chars().count() > MAX_BODY_CHARS {
    errors.add(
      "body",
      format!("is too long (maximum is {MAX_BODY_CHARS} characters)"),
    );
  }
}

/// Validate a complete title/body pair, as written by create and update.
pub fn validate_document(title: &str, body: &str) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::new();
  check_title(title, &mut errors);
  check_body(body, &mut errors);
  errors.into_result()
}

/// Validate the text supplied to an append before it is merged.
pub fn validate_append_text(text: &str) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::new();
  if text.trim().is_empty() {
    errors.add("body", "can't be blank");
  }
  errors.into_result()
}

/// Validate a merged body produced by an append.
pub fn validate_body(body: &str) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::new();
  check_body(body, &mut errors);
  errors.into_result()
}
