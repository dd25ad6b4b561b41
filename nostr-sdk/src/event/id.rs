use bitcoin_hashes::{sha256, Hash};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{kind::EventKind, tag::Tag, Timestamp};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EventId(pub String);

impl EventId {
  ///
  /// This is the way used to serialize and get the SHA256. This will equal to `event.id`.
  /// 32-bytes lowercase hex-encoded sha256 of the the serialized event data:
  ///
  /// `[0, <pubkey>, <created_at>, <kind>, <tags>, <content>]`
  ///
  /// serialized as compact JSON, so strings inside `tags` and `content`
  /// are escaped exactly like any other JSON string.
  ///
  /// <https://github.com/nostr-protocol/nips/blob/master/01.md>
  ///
  pub(crate) fn new(
    pubkey: &str,
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
  use crate::event::tag::InputType;

  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn creates_id() {
    let event_id = EventId::new(
      "614a695bab54e8dc98946abdb8ec019599ece6dada0c23890977d0fa128081d6",
      1684589418,
      EventKind::Text,
      &[],
      "potato",
    );

    assert_eq!(
      event_id.0,
      "00960bd35499f8c63a4f65e79d6b1a2b7f1b8c97e76652325567b78c496350ae"
    );
  }

  #[test]
  fn hashes_the_canonical_array() {
    let tags = vec![
      Tag::Hashtag(String::from("dvm")),
      Tag::Input(String::from(r#"{"a":"b\nc"}"#), InputType::Text),
    ];
    let content = "line\n\"quoted\"";

    let event_id = EventId::new("mockpubkey", 161500343030, EventKind::from(5000), &tags, content);

    let expected_preimage = r#"[0,"mockpubkey",161500343030,5000,[["t","dvm"],["i","{\"a\":\"b\\nc\"}","text"]],"line\n\"quoted\""]"#;
    let expected = EventId(sha256::Hash::hash(expected_preimage.as_bytes()).to_string());

    assert_eq!(expected, event_id);
  }

  #[test]
  fn every_field_changes_the_id() {
    let tags = vec![Tag::Hashtag(String::from("dvm"))];
    let base = EventId::new("pubkey", 1, EventKind::Text, &tags, "content");

    assert_ne!(base, EventId::new("pubkey2", 1, EventKind::Text, &tags, "content"));
    assert_ne!(base, EventId::new("pubkey", 2, EventKind::Text, &tags, "content"));
    assert_ne!(base, EventId::new("pubkey", 1, EventKind::Metadata, &tags, "content"));
    assert_ne!(base, EventId::new("pubkey", 1, EventKind::Text, &[], "content"));
    assert_ne!(base, EventId::new("pubkey", 1, EventKind::Text, &tags, "content2"));
  }
}
