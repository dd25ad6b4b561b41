use bitcoin_hashes::{hex::FromHex, sha256};
use secp256k1::{schnorr, KeyPair, Message, Secp256k1, Signing, Verification, XOnlyPublicKey};
use std::str::FromStr;

/// [`Schnorr`] error
#[derive(thiserror::Error, Debug)]
pub enum SchnorrError {
  /// Error related to bitcoin_hashes::hex
  #[error(transparent)]
  SHA256(#[from] bitcoin_hashes::hex::Error),

  /// Error secp256k1
  #[error(transparent)]
  SECP256K1(#[from] secp256k1::Error),
}

///
/// Signs a Schnorr (BIP-340) signature for an already hashed message.
///
/// If the process of signing happens correctly, returns the `Signature` created.
/// Otherwise, returns a `SchnorrError` with an error message.
///
/// ## Arguments
///
/// * `secp` - A Secp256k1 engine to execute signature.
/// * `msg` - A hex-encoded SHA256 hash (for events, the event id).
/// * `keypair` - The key pair whose secret key signs the message.
///
/// ## Examples
///
/// ```
///     use shipyard_nostr_sdk::schnorr::*;
///     use secp256k1::{KeyPair, Secp256k1, SecretKey};
///     use bitcoin_hashes::{hex::ToHex, sha256, Hash};
///
///     let seckey = [
///      59, 148, 11, 85, 134, 130, 61, 253, 2, 174, 59, 70, 27, 180, 51, 107, 94, 203, 174, 253, 102,
///      39, 170, 146, 46, 252, 4, 143, 236, 12, 136, 28,
///     ];
///     let secp = Secp256k1::new();
///     let keypair = KeyPair::from_secret_key(&secp, &SecretKey::from_slice(&seckey).unwrap());
///     let msg = sha256::Hash::hash(b"This is some message").to_hex();
///     assert!(sign_schnorr(&secp, &msg, &keypair).is_ok());
/// ```
pub fn sign_schnorr<C: Signing>(
  secp: &Secp256k1<C>,
  msg: &str,
  keypair: &KeyPair,
) -> Result<schnorr::Signature, SchnorrError> {
  let hash_from_hex = sha256::Hash::from_hex(msg)?;
  let msg = Message::from_slice(hash_from_hex.as_ref())?;
  Ok(secp.sign_schnorr_no_aux_rand(&msg, keypair))
}

///
/// Verifies a Schnorr signature for an already hashed message.
///
/// Returns `Ok(())` when `sig` was produced over `msg` by the owner of `pubkey`.
///
/// ## Arguments
///
/// * `secp` - A Secp256k1 engine to execute verification.
/// * `msg` - A hex-encoded SHA256 hash.
/// * `sig` - The hex-encoded schnorr signature to verify.
/// * `pubkey` - The hex-encoded x-only public key to verify against.
///
pub fn verify_schnorr<C: Verification>(
  secp: &Secp256k1<C>,
  msg: &str,
  sig: &str,
  pubkey: &str,
) -> Result<(), SchnorrError> {
  let hash_from_hex = sha256::Hash::from_hex(msg)?;
  let msg = Message::from_slice(hash_from_hex.as_ref())?;
  let sig = schnorr::Signature::from_str(sig)?;
  let x_only_pubkey = XOnlyPublicKey::from_str(pubkey)?;

  secp.verify_schnorr(&sig, &msg, &x_only_pubkey).map_err(|err| {
    log::debug!("[verify_schnorr] {err}");
    SchnorrError::SECP256K1(err)
  })
}
