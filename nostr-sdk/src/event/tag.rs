use serde::de::Error as DeserializerError;
use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// [`Tag`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("kind invalid or not implemented")]
  KindNotFound,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub enum TagKind {
  /// Topic of the event.
  ///
  /// `["t", <hashtag>]`
  ///
  Hashtag,
  /// Input of a NIP-90 job.
  ///
  /// `["i", <data>, <input-type>]`
  ///
  /// where `<input-type>` tells how `<data>` must be read
  /// (see [`InputType`]).
  ///
  Input,
  /// Custom tag
  Custom(String),
}

impl fmt::Display for TagKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Hashtag => write!(f, "t"),
      Self::Input => write!(f, "i"),
      Self::Custom(tag) => write!(f, "{tag}"),
    }
  }
}

impl<S> From<S> for TagKind
where
  S: Into<String>,
{
  fn from(s: S) -> Self {
    let s: String = s.into();
    match s.as_str() {
      "t" => Self::Hashtag,
      "i" => Self::Input,
      tag => Self::Custom(tag.to_string()),
    }
  }
}

impl From<&Tag> for TagKind {
  fn from(data: &Tag) -> Self {
    match data {
      Tag::Generic(kind, _) => kind.clone(),
      Tag::Hashtag(_) => TagKind::Hashtag,
      Tag::Input(_, _) => TagKind::Input,
    }
  }
}

/// How the data of an `"i"` tag must be interpreted by a service provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
  /// The data is the input itself. For service invocations this is a
  /// complete serialized event.
  Text,
  Url,
  Event,
  /// Output of a previous job, referenced by its id.
  Job,
}

impl fmt::Display for InputType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Text => write!(f, "text"),
      Self::Url => write!(f, "url"),
      Self::Event => write!(f, "event"),
      Self::Job => write!(f, "job"),
    }
  }
}

impl InputType {
  fn parse(s: &str) -> Option<Self> {
    match s {
      "text" => Some(Self::Text),
      "url" => Some(Self::Url),
      "event" => Some(Self::Event),
      "job" => Some(Self::Job),
      _ => None,
    }
  }
}

/// A tag is an ordered list of strings whose first element names it.
/// Both the order of the tags in an event and the order of the strings
/// inside a tag are part of the signed data, so every variant serializes
/// back to exactly the strings it was built from.
///
///   Example:
///
///   `["t", <topic>]`
///   ```json
///   ["t", "shipyard"]
///   ```
///
///   `["i", <data>, <input-type>]`
///   ```json
///   ["i", "{\"id\":\"...\",\"kind\":5000,...}", "text"]
///   ```
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
  /// Generic because maybe we receive a tag (or a shape of a known tag)
  /// that we don't have implemented.
  Generic(TagKind, Vec<String>),
  Hashtag(String),
  Input(String, InputType),
}

impl Tag {
  pub fn as_vec(&self) -> Vec<String> {
    self.clone().into()
  }

  pub fn kind(&self) -> TagKind {
    TagKind::from(self)
  }
}

impl<S> TryFrom<Vec<S>> for Tag
where
  S: Into<String>,
{
  type Error = Error;

  fn try_from(tag: Vec<S>) -> Result<Self, Self::Error> {
    let tag: Vec<String> = tag.into_iter().map(|v| v.into()).collect();
    let tag_kind: TagKind = match tag.first() {
      Some(kind) => TagKind::from(kind.as_str()),
      None => return Err(Error::KindNotFound),
    };

    match (&tag_kind, tag.len()) {
      (TagKind::Hashtag, 2) => Ok(Self::Hashtag(tag[1].clone())),
      (TagKind::Input, 3) => match InputType::parse(&tag[2]) {
        Some(input_type) => Ok(Self::Input(tag[1].clone(), input_type)),
        None => Ok(Self::Generic(tag_kind, tag[1..].to_vec())),
      },
      _ => Ok(Self::Generic(tag_kind, tag[1..].to_vec())),
    }
  }
}

impl From<Tag> for Vec<String> {
  fn from(data: Tag) -> Self {
    match data {
      Tag::Generic(kind, content) => vec![vec![kind.to_string()], content].concat(),
      Tag::Hashtag(topic) => vec![TagKind::Hashtag.to_string(), topic],
      Tag::Input(data, input_type) => {
        vec![TagKind::Input.to_string(), data, input_type.to_string()]
      }
    }
  }
}

impl Serialize for Tag {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let data: Vec<String> = self.as_vec();
    let mut seq = serializer.serialize_seq(Some(data.len()))?;
    for element in data.iter() {
      seq.serialize_element(element)?;
    }
    seq.end()
  }
}

impl<'de> Deserialize<'de> for Tag {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    // Deserialize to something serde already knows, then pick the variant.
    let vec: Vec<String> = Vec::<String>::deserialize(deserializer)?;
    Self::try_from(vec).map_err(DeserializerError::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn hashtag() {
    let tag = Tag::Hashtag(String::from("dvm"));
    let serialized = r#"["t","dvm"]"#;

    assert_eq!(serde_json::to_string(&tag).unwrap(), serialized);
    assert_eq!(serde_json::from_str::<Tag>(serialized).unwrap(), tag);
    assert_eq!(tag.kind(), TagKind::Hashtag);
  }

  #[test]
  fn input_keeps_embedded_json_verbatim() {
    let embedded = r#"{"kind":5000,"content":"do \"X\""}"#.to_string();
    let tag = Tag::Input(embedded.clone(), InputType::Text);

    let serialized = serde_json::to_string(&tag).unwrap();
    let deserialized: Tag = serde_json::from_str(&serialized).unwrap();

    assert_eq!(deserialized, tag);
    assert_eq!(
      deserialized.as_vec(),
      vec!["i".to_string(), embedded, "text".to_string()]
    );
  }

  #[test]
  fn input_with_extra_fields_stays_generic() {
    let raw = vec!["i", "https://example.com", "url", "wss://relay.com"];
    let tag = Tag::try_from(raw.clone()).unwrap();

    assert_eq!(
      tag,
      Tag::Generic(
        TagKind::Input,
        vec![
          "https://example.com".to_string(),
          "url".to_string(),
          "wss://relay.com".to_string()
        ]
      )
    );
    assert_eq!(tag.as_vec(), raw);
  }

  #[test]
  fn unknown_input_type_stays_generic() {
    let raw = vec!["i", "data", "potato"];
    let tag = Tag::try_from(raw.clone()).unwrap();

    assert_eq!(tag.kind(), TagKind::Input);
    assert!(matches!(tag, Tag::Generic(_, _)));
    assert_eq!(tag.as_vec(), raw);
  }

  #[test]
  fn generic_tags_round_trip() {
    for raw in [
      vec!["e", "688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6", "", "root"],
      vec!["p", "02c7e1b1e9c175ab2d100baf1d5a66e73ecc044e9f8093d0c965741f26aa3abf76"],
      vec!["t"],
      vec!["t", "a", "b"],
      vec!["d", "5905"],
    ] {
      let tag = Tag::try_from(raw.clone()).unwrap();
      let serialized = serde_json::to_string(&tag).unwrap();

      assert_eq!(serialized, serde_json::to_string(&raw).unwrap());
      assert_eq!(serde_json::from_str::<Tag>(&serialized).unwrap(), tag);
    }
  }

  #[test]
  fn empty_tag_is_an_error() {
    assert!(Tag::try_from(Vec::<String>::new()).is_err());
    assert!(serde_json::from_str::<Tag>("[]").is_err());
  }
}
