use serde::{Deserialize, Serialize};

/// A tag is an array of strings whose first element names it.
///
///   Example:
///   ```json
///   ["e", "688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6", "wss://relay.damus.io", "root"]
///   ["p", "02c7e1b1e9c175ab2d100baf1d5a66e73ecc044e9f8093d0c965741f26aa3abf76"]
///   ["d", "my-article"]
///   ```
///
/// Only tags named by a single letter are indexed and can be
/// queried with a `#<letter>` filter.
///
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
  pub fn new<I, S>(parts: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(parts.into_iter().map(Into::into).collect())
  }

  pub fn name(&self) -> Option<&str> {
    self.0.first().map(String::as_str)
  }

  pub fn value(&self) -> Option<&str> {
    self.0.get(1).map(String::as_str)
  }
}

impl<S> From<Vec<S>> for Tag
where
  S: Into<String>,
{
  fn from(parts: Vec<S>) -> Self {
    Self::new(parts)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn reads_name_and_value() {
    let tag = Tag::from(vec!["e", "abc", "wss://relay.damus.io"]);
    assert_eq!(tag.name(), Some("e"));
    assert_eq!(tag.value(), Some("abc"));

    let empty = Tag::default();
    assert_eq!(empty.name(), None);
    assert_eq!(empty.value(), None);
  }

  #[test]
  fn keeps_the_json_array_shape() {
    let tag = Tag::from(vec!["p", "02c7e1", ""]);
    assert_eq!(serde_json::to_string(&tag).unwrap(), r#"["p","02c7e1",""]"#);
    assert_eq!(
      serde_json::from_str::<Tag>(r#"["p","02c7e1",""]"#).unwrap(),
      tag
    );
  }
}
