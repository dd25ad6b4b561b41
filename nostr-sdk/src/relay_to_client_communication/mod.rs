// internal modules
pub mod notice;
pub mod ok;

use serde_json::Value;

use self::{notice::RelayToClientCommNotice, ok::RelayToClientCommOk};

/// [`RelayToClientCommunication`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("Invalid data")]
  InvalidData,
}

/// Messages a relay may answer with while we publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
  Ok(RelayToClientCommOk),
  Notice(RelayToClientCommNotice),
  /// Anything else (`EVENT`, `EOSE`, `AUTH`...) is irrelevant to a publisher.
  Other(String),
}

impl RelayMessage {
  /// Helper to parse a text frame into OK, NOTICE or something else.
  ///
  pub fn from_json(msg: &str) -> Result<Self, Error> {
    let value: Value = serde_json::from_str(msg)?;
    let code = value
      .as_array()
      .and_then(|v| v.first())
      .and_then(Value::as_str)
      .map(str::to_string)
      .ok_or(Error::InvalidData)?;

    match code.as_str() {
      RelayToClientCommOk::CODE => Ok(Self::Ok(RelayToClientCommOk::from_value(value)?)),
      RelayToClientCommNotice::CODE => {
        Ok(Self::Notice(RelayToClientCommNotice::from_value(value)?))
      }
      _ => Ok(Self::Other(code)),
    }
  }
}
