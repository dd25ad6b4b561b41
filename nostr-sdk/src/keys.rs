//! Identity of the publisher: a secp256k1 key pair decoded from a NIP-19 `nsec`.
use bech32::{Bech32, Hrp};
use secp256k1::{KeyPair, Secp256k1, SecretKey, XOnlyPublicKey};

const NSEC_HRP: Hrp = Hrp::parse_unchecked("nsec");
const NPUB_HRP: Hrp = Hrp::parse_unchecked("npub");

/// [`Keys`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Malformed bech32 string or failed checksum
  #[error("invalid bech32 encoding: {0}")]
  Decode(#[from] bech32::DecodeError),
  #[error("expected an `nsec` key, found prefix `{0}`")]
  WrongPrefix(String),
  #[error("secret key must be 32 bytes, found {0}")]
  InvalidLength(usize),
  /// Zero or out-of-range scalar
  #[error(transparent)]
  InvalidSecretKey(#[from] secp256k1::Error),
  #[error(transparent)]
  Encode(#[from] bech32::EncodeError),
}

/// A secret key and the x-only public key derived from it.
///
/// The public key is computed once when the [`Keys`] are built and is never
/// recomputed, so every event signed with the same [`Keys`] carries the same
/// `pubkey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keys {
  keypair: KeyPair,
  public_key: XOnlyPublicKey,
}

impl Keys {
  pub fn new(secret_key: SecretKey) -> Self {
    let secp = Secp256k1::new();
    let keypair = KeyPair::from_secret_key(&secp, &secret_key);
    let (public_key, _parity) = XOnlyPublicKey::from_keypair(&keypair);

    Self {
      keypair,
      public_key,
    }
  }

  /// Random keys, used for throwaway identities.
  pub fn generate() -> Self {
    Self::new(SecretKey::new(&mut rand::thread_rng()))
  }

  /// Builds [`Keys`] from raw secret key bytes.
  pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, Error> {
    if secret.len() != 32 {
      return Err(Error::InvalidLength(secret.len()));
    }

    Ok(Self::new(SecretKey::from_slice(secret)?))
  }

  ///
  /// Decodes a bech32 `nsec1...` string (NIP-19) and derives its public key.
  ///
  /// ## Example
  ///
  /// ```
  ///   use shipyard_nostr_sdk::keys::Keys;
  ///
  ///   let keys = Keys::from_nsec("nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5").unwrap();
  ///   assert_eq!(
  ///     keys.public_key(),
  ///     "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e"
  ///   );
  /// ```
  pub fn from_nsec(nsec: &str) -> Result<Self, Error> {
    let (hrp, data) = bech32::decode(nsec.trim())?;

    if hrp != NSEC_HRP {
      return Err(Error::WrongPrefix(hrp.to_string()));
    }

    Self::from_secret_bytes(&data)
  }

  /// Hex-encoded x-only public key, as carried in `event.pubkey`.
  pub fn public_key(&self) -> String {
    self.public_key.to_string()
  }

  pub fn keypair(&self) -> &KeyPair {
    &self.keypair
  }

  pub fn to_nsec(&self) -> Result<String, Error> {
    Ok(bech32::encode::<Bech32>(
      NSEC_HRP,
      &self.keypair.secret_bytes(),
    )?)
  }

  pub fn to_npub(&self) -> Result<String, Error> {
    Ok(bech32::encode::<Bech32>(
      NPUB_HRP,
      &self.public_key.serialize(),
    )?)
  }
}
