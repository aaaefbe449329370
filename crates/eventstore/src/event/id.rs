use bitcoin_hashes::{sha256, Hash};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{kind::EventKind, tag::Tag, PubKey, Timestamp};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EventId(pub String);

impl EventId {
  ///
  /// 32-bytes lowercase hex-encoded sha256 of the serialized event data:
  /// `[0, <pubkey>, <created_at>, <kind>, <tags>, <content>]`
  ///
  /// <https://github.com/nostr-protocol/nips/blob/master/01.md>
  ///
  pub fn new(
    pubkey: &PubKey,
    created_at: Timestamp,
    kind: EventKind,
    tags: &[Tag],
    content: &str,
  ) -> Self {
    let data = json!([0, pubkey, created_at, kind, tags, content]).to_string();

    let hash = sha256::Hash::hash(data.as_bytes());
    Self(hash.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn creates_id() {
    let mock_pub_key: PubKey = String::from("mockpubkey");
    let mock_created_at: Timestamp = 161500343030;
    let mock_tags = vec![Tag::from(vec![
      "e",
      "event_im_replying_to",
      "wss://recommended.relay.com",
      "reply",
    ])];
    let mock_content = "mock \"quoted\" content";

    let event_id = EventId::new(
      &mock_pub_key,
      mock_created_at,
      EventKind::Text,
      &mock_tags,
      mock_content,
    );

    let expected = r#"[0,"mockpubkey",161500343030,1,[["e","event_im_replying_to","wss://recommended.relay.com","reply"]],"mock \"quoted\" content"]"#;
    let expected = EventId(sha256::Hash::hash(expected.as_bytes()).to_string());

    assert_eq!(expected, event_id);
    assert_eq!(event_id.0.len(), 64);
  }
}
