use serde_json::{json, Value};

use super::Error;

/// Relay answer to an `EVENT` (NIP-20):
///
/// `["OK", <event_id>, <true|false>, <message>]`
///
/// `accepted == false` means the relay refused to store the event;
/// `message` usually carries a machine readable prefix such as
/// `duplicate:`, `blocked:` or `rate-limited:`.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayToClientCommOk {
  pub event_id: String,
  pub accepted: bool,
  pub message: String,
}

impl RelayToClientCommOk {
  pub const CODE: &'static str = "OK";

  pub fn new_ok(event_id: String, accepted: bool, message: String) -> Self {
    Self {
      event_id,
      accepted,
      message,
    }
  }

  pub fn as_value(&self) -> Value {
    json!([Self::CODE, self.event_id, self.accepted, self.message])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    // Some relays omit the message, so accept 3 or 4 elements.
    if !(3..=4).contains(&v.len()) || v[0] != Self::CODE {
      return Err(Error::InvalidData);
    }

    let event_id: String = serde_json::from_value(v[1].clone())?;
    let accepted: bool = serde_json::from_value(v[2].clone())?;
    let message: String = match v.get(3) {
      Some(message) => serde_json::from_value(message.clone())?,
      None => String::new(),
    };

    Ok(Self::new_ok(event_id, accepted, message))
  }

  /// Get [`RelayToClientCommOk`] as JSON string
  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }

  /// Get [`RelayToClientCommOk`] from JSON
  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    let msg: &str = &msg.into();

    if msg.is_empty() {
      return Err(Error::InvalidData);
    }

    let json_value: Value = serde_json::from_str(msg)?;
    Self::from_value(json_value)
  }
}
