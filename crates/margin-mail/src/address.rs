//! Parsing of the addressing fields of an inbound message.
//!
//! Both functions are total: malformed input falls back to the raw value (or
//! to "no reference") instead of failing.

/// Local-part prefix of the per-note reply address, `note-<id>@domain`.
pub const NOTE_ADDRESS_PREFIX: &str = "note-";

/// Extract the bracketed address from a `From`-style header value.
///
/// `"John <john@example.com>"` yields `"john@example.com"`; a value without a
/// non-empty `<...>` pair is returned unchanged.
pub fn parse_sender(from: &str) -> &str {
  match (from.find('<'), from.rfind('>')) {
    (Some(open), Some(close)) if close > open + 1 => &from[open + 1..close],
    _ => from,
  }
}

/// The document reference encoded in a reply address, if it is one.
///
/// `"note-42@mail.example.com"` yields `Some("42")`; any other local part
/// yields `None`.
pub fn note_reference(recipient: &str) -> Option<&str> {
  let address = parse_sender(recipient).trim();
  let local = address.split('@').next().unwrap_or(address);
  local
    .strip_prefix(NOTE_ADDRESS_PREFIX)
    .filter(|reference| !reference.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sender_with_display_name() {
    assert_eq!(parse_sender("John <john@example.com>"), "john@example.com");
  }

  #[test]
  fn bare_sender_is_unchanged() {
    assert_eq!(parse_sender("john@example.com"), "john@example.com");
  }

  #[test]
  fn unparsable_sender_falls_back_to_raw() {
    for raw in ["", "<>", "John >john@example.com<", "John <john@example.com"] {
      assert_eq!(parse_sender(raw), raw);
    }
  }

  #[test]
  fn quoted_display_name() {
    assert_eq!(
      parse_sender("\"Doe, John\" <john@example.com>"),
      "john@example.com"
    );
  }

  #[test]
  fn recipient_reference() {
    assert_eq!(note_reference("note-42@mail.example.com"), Some("42"));
    assert_eq!(
      note_reference("Notes <note-abc-123@mail.example.com>"),
      Some("abc-123")
    );
  }

  #[test]
  fn non_note_recipients_have_no_reference() {
    assert_eq!(note_reference("new@mail.example.com"), None);
    assert_eq!(note_reference("note-@mail.example.com"), None);
    assert_eq!(note_reference("notes@mail.example.com"), None);
    assert_eq!(note_reference(""), None);
  }
}
