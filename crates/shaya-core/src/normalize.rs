//! Full-name normalisation applied before a person is persisted.

/// Connector words that stay lowercase wherever they appear in a name.
const CONNECTORS: [&str; 6] = ["de", "del", "la", "las", "los", "y"];

/// Capitalise every whitespace-delimited token of `name`, except connector
/// words, which are forced to lowercase (even in first position).
///
/// Runs of whitespace collapse to a single space.
///
/// ```
/// use shaya_core::normalize::format_name;
/// assert_eq!(format_name("maria DE las mercedes"), "Maria de las Mercedes");
/// ```
pub fn format_name(name: &str) -> String {
  name
    .split_whitespace()
    .map(|word| {
      let lower = word.to_lowercase();
      if CONNECTORS.contains(&lower.as_str()) {
        lower
      } else {
        capitalize(&lower)
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
