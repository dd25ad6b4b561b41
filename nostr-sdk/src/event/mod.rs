use secp256k1::Secp256k1;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Event Modules
pub mod id;
pub mod kind;
pub mod tag;

use self::id::EventId;
use self::kind::EventKind;
use self::tag::Tag;
use crate::keys::Keys;
use crate::schnorr::SchnorrError;

pub type PubKey = String;
pub type Timestamp = u64;

/// [`Event`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("Invalid data")]
  InvalidData,
  /// The keys cannot produce a signature over the event id
  #[error("could not sign event: {0}")]
  Signing(#[from] SchnorrError),
  #[error("event pubkey {event} does not belong to the signing keys ({keys})")]
  PubKeyMismatch { event: PubKey, keys: PubKey },
}

///
/// Event is the only object that exists in the Nostr protocol.
///
/// Example (a job request wrapped by a service invocation; ids and
/// signatures are shortened):
///   ```json
///   {
///     "id": "b1c2...",
///     "pubkey": "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e",
///     "created_at": 1700000050,
///     "kind": 5905,
///     "tags": [
///       ["i", "{\"id\":\"a0b1...\",\"pubkey\":\"7e7e...\",\"created_at\":1700000000,\"kind\":5000,\"tags\":[[\"t\",\"dvm\"],[\"t\",\"shipyard\"]],\"content\":\"do X\",\"sig\":\"...\"}", "text"]
///     ],
///     "content": "",
///     "sig": "e855..."
///   }
///   ```
///
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Event {
  /// 32-bytes SHA256 of the serialized event data
  pub id: String,
  /// 32-bytes hex-encoded x-only public key of the event creator
  pub pubkey: PubKey,
  /// Unix timestamp in seconds
  pub created_at: Timestamp,
  /// Kind of event
  pub kind: EventKind,
  /// An array of arrays with more info about the event.
  /// The kind of event will change its tags and contents.
  pub tags: Vec<Tag>,
  /// Arbitrary string. Meaning depends on the kind of the event.
  pub content: String,
  /// 64-bytes hex schnorr signature of the id field
  pub sig: String,
}

impl Event {
  pub fn new_without_signature(
    pubkey: PubKey,
    created_at: Timestamp,
    kind: EventKind,
    tags: Vec<Tag>,
    content: String,
  ) -> Self {
    let id = EventId::new(&pubkey, created_at, kind, &tags, &content);
    Self {
      id: id.0,
      pubkey,
      created_at,
      kind,
      tags,
      content,
      ..Default::default()
    }
  }

  /// Recomputes `id` from the current fields and signs it with `keys`.
  ///
  /// The event must already carry the public key of `keys`.
  pub fn sign(&mut self, keys: &Keys) -> Result<(), Error> {
    if self.pubkey != keys.public_key() {
      return Err(Error::PubKeyMismatch {
        event: self.pubkey.clone(),
        keys: keys.public_key(),
      });
    }

    self.id = self.compute_id().0;

    let secp = Secp256k1::new();
    let signed = crate::schnorr::sign_schnorr(&secp, &self.id, keys.keypair())?;
    self.sig = signed.to_string();
    Ok(())
  }

  fn compute_id(&self) -> EventId {
    EventId::new(
      &self.pubkey,
      self.created_at,
      self.kind,
      &self.tags,
      &self.content,
    )
  }

  pub fn check_event_id(&self) -> bool {
    self.compute_id().0 == self.id
  }

  pub fn check_event_signature(&self) -> bool {
    let secp = Secp256k1::verification_only();
    crate::schnorr::verify_schnorr(&secp, &self.id, &self.sig, &self.pubkey).is_ok()
  }

  /// `true` when `id` matches the content and `sig` matches `id` and `pubkey`.
  pub fn verify(&self) -> bool {
    self.check_event_id() && self.check_event_signature()
  }

  /// Deserializes from [`Value`]
  pub fn from_value(msg: Value) -> Result<Self, Error> {
    serde_json::from_value(msg).map_err(Error::Json)
  }

  /// Deserialize [`Event`] from JSON string
  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    let msg: &str = &msg.into();

    if msg.is_empty() {
      return Err(Error::InvalidData);
    }

    Ok(serde_json::from_str(msg)?)
  }

  /// Get [`Event`] in JSON string, fields in wire order
  /// (`id`, `pubkey`, `created_at`, `kind`, `tags`, `content`, `sig`).
  pub fn as_json(&self) -> Result<String, Error> {
    Ok(serde_json::to_string(self)?)
  }
}
