//! BIP-340 signatures over event ids.
//!
//! Event ids are hex encoded SHA256 digests, so they are signed as-is
//! without hashing again.

use std::str::FromStr;

use bitcoin_hashes::{hex::FromHex, sha256};
use secp256k1::{
  schnorr::Signature, KeyPair, Message, Secp256k1, SecretKey, Signing, Verification,
  XOnlyPublicKey,
};

/// [`schnorr`] error
#[derive(thiserror::Error, Debug)]
pub enum SchnorrError {
  #[error("event id is not a hex SHA256 digest: {0}")]
  InvalidId(#[from] bitcoin_hashes::hex::Error),
  #[error(transparent)]
  Secp256k1(#[from] secp256k1::Error),
}

fn id_message(id: &str) -> Result<Message, SchnorrError> {
  let digest = sha256::Hash::from_hex(id)?;
  Ok(Message::from_slice(digest.as_ref())?)
}

fn keypair<C: Signing>(secp: &Secp256k1<C>, secret: &[u8]) -> Result<KeyPair, SchnorrError> {
  let secret = SecretKey::from_slice(secret)?;
  Ok(KeyPair::from_secret_key(secp, &secret))
}

/// Hex x-only public key of a raw 32-byte secret key.
pub fn x_only_public_key<C: Signing>(
  secp: &Secp256k1<C>,
  secret: &[u8],
) -> Result<String, SchnorrError> {
  let keypair = keypair(secp, secret)?;
  Ok(XOnlyPublicKey::from_keypair(&keypair).0.to_string())
}

/// Signs the event `id` without auxiliary randomness, so the same key and
/// id always give the same signature.
///
/// ```
/// use nostr_media_sdk::schnorr::{sign_id, verify_id, x_only_public_key};
/// use secp256k1::Secp256k1;
///
/// let secp = Secp256k1::new();
/// let secret = [7u8; 32];
/// let id = "00960bd35499f8c63a4f65e79d6b1a2b7f1b8c97e76652325567b78c496350ae";
/// let signature = sign_id(&secp, id, &secret).unwrap();
/// let pubkey = x_only_public_key(&secp, &secret).unwrap();
/// assert!(verify_id(&secp, id, &signature.to_string(), &pubkey).is_ok());
/// ```
pub fn sign_id<C: Signing>(
  secp: &Secp256k1<C>,
  id: &str,
  secret: &[u8],
) -> Result<Signature, SchnorrError> {
  let message = id_message(id)?;
  let keypair = keypair(secp, secret)?;
  Ok(secp.sign_schnorr_no_aux_rand(&message, &keypair))
}

/// Checks a hex signature of the event `id` against a hex x-only public key.
pub fn verify_id<C: Verification>(
  secp: &Secp256k1<C>,
  id: &str,
  signature: &str,
  pubkey: &str,
) -> Result<(), SchnorrError> {
  let message = id_message(id)?;
  let signature = Signature::from_str(signature)?;
  let pubkey = XOnlyPublicKey::from_str(pubkey)?;
  secp.verify_schnorr(&signature, &message, &pubkey)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use secp256k1::All;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  const SECRET_HEX: &str = "7f7ff03d123792d6ac594bfa67bf6d0c0ab55b6b1fdb6249303fe861f1ccba9a";
  const ID: &str = "5c83da77af1dec6d7289834998ad7aafbd9e2191396d75ec3cc27f5a77226f36";

  fn make_sut() -> (Secp256k1<All>, [u8; 32]) {
    let mut secret = [0u8; 32];
    hex::decode_to_slice(SECRET_HEX, &mut secret).unwrap();
    (Secp256k1::new(), secret)
  }

  #[test]
  fn signatures_are_deterministic_and_verify() {
    let (secp, secret) = make_sut();
    let pubkey = x_only_public_key(&secp, &secret).unwrap();

    let first = sign_id(&secp, ID, &secret).unwrap();
    let second = sign_id(&secp, ID, &secret).unwrap();

    assert_eq!(first, second);
    assert_eq!(pubkey.len(), 64);
    assert!(verify_id(&secp, ID, &first.to_string(), &pubkey).is_ok());
  }

  #[test]
  fn verifies_a_known_event() {
    let (secp, _) = make_sut();
    let result = verify_id(
      &secp,
      "00960bd35499f8c63a4f65e79d6b1a2b7f1b8c97e76652325567b78c496350ae",
      "bf073c935f71de50ec72bdb79f75b0bf32f9049305c3b22f97c06422c6f2edc86e0d7e07d7d7222678b238b1daee071be5f6fa653c611971395ec0d1c6407caf",
      "614a695bab54e8dc98946abdb8ec019599ece6dada0c23890977d0fa128081d6",
    );
    assert!(result.is_ok());
  }

  #[test]
  fn signature_of_another_id_is_rejected() {
    let (secp, secret) = make_sut();
    let pubkey = x_only_public_key(&secp, &secret).unwrap();
    let other = "00960bd35499f8c63a4f65e79d6b1a2b7f1b8c97e76652325567b78c496350ae";
    let signature = sign_id(&secp, other, &secret).unwrap();

    let result = verify_id(&secp, ID, &signature.to_string(), &pubkey);

    assert!(matches!(result, Err(SchnorrError::Secp256k1(_))));
  }

  #[test]
  fn zero_secret_key_is_rejected() {
    let (secp, _) = make_sut();
    let result = sign_id(&secp, ID, &[0u8; 32]);
    assert!(matches!(result, Err(SchnorrError::Secp256k1(_))));
  }

  #[test]
  fn ids_must_be_hex_digests() {
    let (secp, secret) = make_sut();
    assert!(matches!(
      sign_id(&secp, "not an id", &secret),
      Err(SchnorrError::InvalidId(_))
    ));
  }
}
