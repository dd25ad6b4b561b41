use serde_json::Value;

use crate::event::Event;

use super::Error;

/// `["EVENT", <event JSON>]`, sent by a client to publish an event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientToRelayCommEvent {
  pub event: Event,
}

impl ClientToRelayCommEvent {
  pub const CODE: &'static str = "EVENT";

  pub fn new_event(event: Event) -> Self {
    Self { event }
  }

  /// Get event communication as JSON string.
  ///
  /// The event keeps its wire field order inside the array.
  pub fn as_json(&self) -> Result<String, Error> {
    Ok(serde_json::to_string(&(Self::CODE, &self.event))?)
  }

  /// Deserialize [`ClientToRelayCommEvent`] from JSON string
  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    let msg: &str = &msg.into();

    if msg.is_empty() {
      return Err(Error::InvalidData);
    }

    let value: Value = serde_json::from_str(msg)?;
    Self::from_value(value)
  }

  /// Deserialize from [`Value`]
  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    // ["EVENT", <event JSON>]
    if v.len() != 2 || v[0] != Self::CODE {
      return Err(Error::InvalidData);
    }

    let event: Event = serde_json::from_value(v[1].clone())?;
    Ok(Self::new_event(event))
  }
}
