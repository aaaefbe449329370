use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::{kind::EventKind, Event, PubKey, Timestamp};
use crate::Error;

///
/// Filters describe which events a reader is interested in.
/// The attributes of a Filter work as `&&` (in other words, all the conditions set must be present
/// in the event in order to pass the filter), while the values inside one attribute work as `||`.
///
/// - ids: a list of event ids or prefixes
/// - authors: a list of publickeys or prefixes, the pubkey of an event must be one of these
/// - kinds: a list of kind numbers
/// - tags: `#<letter>` keys, each with a list of values that one tag of that letter must hold
/// - since: a timestamp. Events must be newer than this to pass
/// - until: a timestamp. Events must be older than this to pass
/// - limit: maximum number of events to be returned
///
/// An attribute set to an empty list matches nothing.
///
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Filter {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ids: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub authors: Option<Vec<PubKey>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kinds: Option<Vec<EventKind>>,
  #[serde(flatten)]
  pub tags: BTreeMap<String, Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub since: Option<Timestamp>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub until: Option<Timestamp>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limit: Option<u64>,
}

impl Filter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_ids(&mut self, ids: Vec<String>) -> &mut Self {
    if ids.is_empty() {
      return self;
    }

    self.ids = Some(ids);
    self
  }

  pub fn add_authors(&mut self, authors: Vec<String>) -> &mut Self {
    if authors.is_empty() {
      return self;
    }

    self.authors = Some(authors);
    self
  }

  pub fn add_kinds(&mut self, kinds: Vec<u64>) -> &mut Self {
    if kinds.is_empty() {
      return self;
    }

    self.kinds = Some(kinds.into_iter().map(EventKind::from).collect());
    self
  }

  /// Adds a `#<letter>` condition.
  pub fn add_tag(&mut self, letter: char, values: Vec<String>) -> &mut Self {
    if values.is_empty() {
      return self;
    }

    self.tags.insert(format!("#{letter}"), values);
    self
  }

  pub fn add_since(&mut self, since: Timestamp) -> &mut Self {
    self.since = Some(since);
    self
  }

  pub fn add_until(&mut self, until: Timestamp) -> &mut Self {
    self.until = Some(until);
    self
  }

  pub fn add_limit(&mut self, limit: u64) -> &mut Self {
    self.limit = Some(limit);
    self
  }

  /// `(tag name, values)` pairs of the `#<name>` conditions.
  pub fn tag_conditions(&self) -> impl Iterator<Item = (&str, &Vec<String>)> {
    self
      .tags
      .iter()
      .filter_map(|(key, values)| key.strip_prefix('#').map(|name| (name, values)))
  }

  /// Whether some attribute is an explicitly empty list.
  pub fn matches_nothing(&self) -> bool {
    self.ids.as_ref().map(Vec::is_empty).unwrap_or(false)
      || self.authors.as_ref().map(Vec::is_empty).unwrap_or(false)
      || self.kinds.as_ref().map(Vec::is_empty).unwrap_or(false)
      || self.tags.values().any(Vec::is_empty)
  }

  /// Rejects values the storage layer cannot express.
  pub fn validate(&self) -> Result<(), Error> {
    for id in self.ids.iter().flatten() {
      if !is_hex_prefix(id) {
        return Err(Error::InvalidFilter(format!("invalid id prefix {id:?}")));
      }
    }

    for author in self.authors.iter().flatten() {
      if !is_hex_prefix(author) {
        return Err(Error::InvalidFilter(format!(
          "invalid author prefix {author:?}"
        )));
      }
    }

    for key in self.tags.keys() {
      let valid = key
        .strip_prefix('#')
        .map(|name| name.chars().count() == 1)
        .unwrap_or(false);
      if !valid {
        return Err(Error::InvalidFilter(format!("invalid tag key {key:?}")));
      }
    }

    Ok(())
  }

  pub fn matches(&self, event: &Event) -> bool {
    // Check IDs
    if let Some(ids) = &self.ids {
      if !ids.iter().any(|id| event.id.starts_with(id.as_str())) {
        return false;
      }
    }

    // Check Authors
    if let Some(authors) = &self.authors {
      if !authors
        .iter()
        .any(|author| event.pubkey.starts_with(author.as_str()))
      {
        return false;
      }
    }

    // Check Kinds
    if let Some(kinds) = &self.kinds {
      if !kinds.contains(&event.kind) {
        return false;
      }
    }

    if let Some(since) = self.since {
      if event.created_at < since {
        return false;
      }
    }

    if let Some(until) = self.until {
      if event.created_at > until {
        return false;
      }
    }

    // Check #<letter> tags
    self.tag_conditions().all(|(name, values)| {
      event.tags.iter().any(|tag| {
        tag.name() == Some(name)
          && tag
            .value()
            .map(|value| values.iter().any(|wanted| wanted == value))
            .unwrap_or(false)
      })
    })
  }

  /// Deserialize [`Filter`] from JSON string
  pub fn from_json(msg: &str) -> Result<Self, Error> {
    if msg.is_empty() {
      return Err(Error::InvalidData);
    }

    Ok(serde_json::from_str(msg)?)
  }
}

fn is_hex_prefix(value: &str) -> bool {
  !value.is_empty()
    && value.len() <= 64
    && value
      .chars()
      .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::tag::Tag;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  fn mock_event() -> Event {
    Event {
      id: "ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb".to_string(),
      pubkey: "02c7e1b1e9c175ab2d100baf1d5a66e73ecc044e9f8093d0c965741f26aa3abf76".to_string(),
      created_at: 1673002822,
      kind: EventKind::Text,
      tags: vec![
        Tag::from(vec!["e", "688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6", "wss://relay.damus.io", "root"]),
        Tag::from(vec!["t", "nostr"]),
      ],
      content: "Lorem ipsum dolor sit amet".to_string(),
      sig: String::new(),
    }
  }

  #[test]
  fn test_filter_deserializes_generic_tags() {
    let filter = Filter::from_json(
      r##"{"ids":["ca97"],"kinds":[1,30023],"#e":["6887"],"#t":["nostr"],"since":10,"limit":5}"##,
    )
    .unwrap();

    let mut expected = Filter::new();
    expected
      .add_ids(vec!["ca97".to_string()])
      .add_kinds(vec![1, 30023])
      .add_tag('e', vec!["6887".to_string()])
      .add_tag('t', vec!["nostr".to_string()])
      .add_since(10)
      .add_limit(5);

    assert_eq!(filter, expected);
    assert_eq!(
      serde_json::to_value(&filter).unwrap(),
      serde_json::json!({"ids":["ca97"],"kinds":[1,30023],"#e":["6887"],"#t":["nostr"],"since":10,"limit":5})
    );
  }

  #[test]
  fn test_empty_filter_matches_everything() {
    assert!(Filter::new().matches(&mock_event()));
    assert!(!Filter::new().matches_nothing());
  }

  #[test]
  fn test_ids_and_authors_match_by_prefix() {
    let event = mock_event();

    let mut filter = Filter::new();
    filter.add_ids(vec!["ca9781".to_string()]);
    assert!(filter.matches(&event));

    filter.add_ids(vec!["ffff".to_string()]);
    assert!(!filter.matches(&event));

    let mut filter = Filter::new();
    filter.add_authors(vec!["beef".to_string(), "02c7e1".to_string()]);
    assert!(filter.matches(&event));
  }

  #[test]
  fn test_kinds_and_time_window() {
    let event = mock_event();

    let mut filter = Filter::new();
    filter.add_kinds(vec![0, 1]).add_since(1673002822).add_until(1673002822);
    assert!(filter.matches(&event));

    filter.add_until(1673002821);
    assert!(!filter.matches(&event));

    let mut filter = Filter::new();
    filter.add_kinds(vec![7]);
    assert!(!filter.matches(&event));
  }

  #[test]
  fn test_tag_conditions_use_the_tag_letter() {
    let event = mock_event();

    let mut filter = Filter::new();
    filter.add_tag(
      'e',
      vec!["688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6".to_string()],
    );
    assert!(filter.matches(&event));

    // same value, different letter
    let mut filter = Filter::new();
    filter.add_tag(
      'p',
      vec!["688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6".to_string()],
    );
    assert!(!filter.matches(&event));

    let mut filter = Filter::new();
    filter
      .add_tag('t', vec!["bitcoin".to_string(), "nostr".to_string()])
      .add_tag('e', vec!["nope".to_string()]);
    assert!(!filter.matches(&event));
  }

  #[test]
  fn test_explicitly_empty_list_matches_nothing() {
    let filter = Filter {
      authors: Some(vec![]),
      ..Default::default()
    };
    assert!(filter.matches_nothing());
    assert!(!filter.matches(&mock_event()));
  }

  #[test]
  fn test_validate_rejects_what_storage_cannot_express() {
    let mut filter = Filter::new();
    filter.add_ids(vec!["CA97".to_string()]);
    assert!(matches!(filter.validate(), Err(Error::InvalidFilter(_))));

    let mut filter = Filter::new();
    filter.add_authors(vec!["ab%".to_string()]);
    assert!(matches!(filter.validate(), Err(Error::InvalidFilter(_))));

    let mut filter = Filter::new();
    filter.tags.insert("#alt".to_string(), vec!["x".to_string()]);
    assert!(matches!(filter.validate(), Err(Error::InvalidFilter(_))));

    let mut filter = Filter::new();
    filter
      .add_ids(vec!["ca97".to_string()])
      .add_tag('d', vec!["slug".to_string()]);
    assert!(filter.validate().is_ok());
  }
}
