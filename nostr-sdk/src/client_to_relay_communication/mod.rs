/// The `client -> relay` communication used by this client.
///
///  - `["EVENT", event_JSON]`: used to publish events
///
/// Subscriptions (`REQ`/`CLOSE`) are never sent: the client only publishes.
///

// Internal `client_to_relay_communication` modules
pub mod event;

/// [`ClientToRelayCommunication`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("Invalid data")]
  InvalidData,
}
