use serde::de::{Deserialize, Deserializer, Error, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Kind of the NIP-90 "service invocation" wrapper that carries a job request.
pub const KIND_SERVICE_INVOCATION: u64 = 5905;
/// Kind of NIP-89 handler recommendations. Only named here, never queried.
pub const KIND_HANDLER_RECOMMENDATION: u64 = 31989;

/// Range reserved by NIP-90 for job requests.
const JOB_REQUEST_RANGE: std::ops::RangeInclusive<u64> = 5000..=5999;

/// Defines the type of the event.
/// Different types will change the meaning of different keys
/// of event object.
/// `Text` is the default.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
  /// The content is set to a stringfied JSON object
  /// `{name: <username>, about: <string>, picture: <url, string>}`
  /// describing the user who created the event.
  Metadata,
  /// The content is set to the plaintext content of a note.
  #[default]
  Text,
  /// The content is set to the URL (e.g.: `wss://somerelay.com`) of a relay
  /// the event creator wants to recommend to its followers.
  RecommendRelay,
  /// Wrapper whose `"i"` tag embeds a complete signed job request.
  ServiceInvocation,
  /// Any other job request in the NIP-90 range (`5000..=5999`).
  JobRequest(u64),
  /// NIP-89 recommendation of a service handler.
  HandlerRecommendation,
  /// A custom kind that we haven't implemented yet.
  Custom(u64),
}

impl EventKind {
  pub fn as_u64(&self) -> u64 {
    (*self).into()
  }

  pub fn is_job_request(&self) -> bool {
    JOB_REQUEST_RANGE.contains(&self.as_u64())
  }
}

impl FromStr for EventKind {
  type Err = ParseIntError;
  fn from_str(event_kind: &str) -> Result<Self, Self::Err> {
    let event_kind: u64 = event_kind.parse()?;
    Ok(Self::from(event_kind))
  }
}

impl From<u64> for EventKind {
  fn from(u: u64) -> Self {
    match u {
      0 => Self::Metadata,
      1 => Self::Text,
      2 => Self::RecommendRelay,
      KIND_SERVICE_INVOCATION => Self::ServiceInvocation,
      KIND_HANDLER_RECOMMENDATION => Self::HandlerRecommendation,
      x if JOB_REQUEST_RANGE.contains(&x) => Self::JobRequest(x),
      x => Self::Custom(x),
    }
  }
}

impl From<EventKind> for u64 {
  fn from(e: EventKind) -> u64 {
    match e {
      EventKind::Metadata => 0,
      EventKind::Text => 1,
      EventKind::RecommendRelay => 2,
      EventKind::ServiceInvocation => KIND_SERVICE_INVOCATION,
      EventKind::HandlerRecommendation => KIND_HANDLER_RECOMMENDATION,
      EventKind::JobRequest(u) => u,
      EventKind::Custom(u) => u,
    }
  }
}

impl Serialize for EventKind {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_u64(From::from(*self))
  }
}

struct EventKindVisitor;

impl Visitor<'_> for EventKindVisitor {
  type Value = EventKind;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "an unsigned number of maximum length of 64 bits")
  }

  fn visit_u64<E>(self, v: u64) -> Result<EventKind, E>
  where
    E: Error,
  {
    Ok(From::<u64>::from(v))
  }
}

impl<'de> Deserialize<'de> for EventKind {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_u64(EventKindVisitor)
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.as_u64())
  }
}
