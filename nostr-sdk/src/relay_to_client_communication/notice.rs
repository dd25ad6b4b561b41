use serde_json::{json, Value};

use super::Error;

/// Human readable message from a relay:
///
/// `["NOTICE", <message>]`
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayToClientCommNotice {
  pub message: String,
}

impl RelayToClientCommNotice {
  pub const CODE: &'static str = "NOTICE";

  pub fn new_notice(message: String) -> Self {
    Self { message }
  }

  pub fn as_value(&self) -> Value {
    json!([Self::CODE, self.message])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    // ["NOTICE", <message>]
    if v.len() != 2 || v[0] != Self::CODE {
      return Err(Error::InvalidData);
    }

    let message = serde_json::from_value(v[1].clone())?;
    Ok(Self::new_notice(message))
  }

  /// Get [`RelayToClientCommNotice`] as JSON string
  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }
}
