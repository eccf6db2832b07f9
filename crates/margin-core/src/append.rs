//! Body concatenation policy shared by direct and mail-driven appends.

/// Merge `new_text` onto the end of `existing`.
///
/// Existing content is kept verbatim. The new text is trimmed and placed after
/// exactly one blank line; newlines already trailing `existing` count towards
/// that separator. Repeated appends of the same text are not deduplicated.
pub fn merge(existing: &str, new_text: &str) -> String {
  let addition = new_text.trim();
  if existing.is_empty() {
    return addition.to_owned();
  }

  let separator = if existing.ends_with("\n\n") {
    ""
  } else if existing.ends_with('\n') {
    "\n"
  } else {
    "\n\n"
  };

  let mut merged =
    String::with_capacity(existing.len() + separator.len() + addition.len());
  merged.push_str(existing);
  merged.push_str(separator);
  merged.push_str(addition);
  merged
}

#[cfg(test)]
mod tests {
  use super::merge;

  #[test]
  fn inserts_one_blank_line() {
    assert_eq!(merge("Hello", "World"), "Hello\n\nWorld");
  }

  #[test]
  fn trims_new_text() {
    assert_eq!(merge("Hello", "  \n World \n\n"), "Hello\n\nWorld");
  }

  #[test]
  fn reuses_trailing_newlines() {
    assert_eq!(merge("Hello\n", "World"), "Hello\n\nWorld");
    assert_eq!(merge("Hello\n\n", "World"), "Hello\n\nWorld");
  }

  #[test]
  fn never_touches_existing_content() {
    let existing = "  indented\n\n\n\nspaced  ";
    let merged = merge(existing, "tail");
    assert!(merged.starts_with(existing));
    assert!(merged.ends_with("tail"));
  }

  #[test]
  fn empty_existing_body_takes_text_alone() {
    assert_eq!(merge("", " first line "), "first line");
  }

  #[test]
  fn repeated_appends_are_kept() {
    let once = merge("list", "milk");
    let twice = merge(&once, "milk");
    assert_eq!(twice, "list\n\nmilk\n\nmilk");
  }
}
