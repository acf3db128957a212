//! Signing capability shared by the event pipeline, the Blossom uploader
//! and the relay authentication handshake.

use async_trait::async_trait;
use secp256k1::{All, Secp256k1};

use crate::{
  event::{Event, PubKey},
  keys, schnorr,
};

/// [`EventSigner`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Key(#[from] keys::Error),
  #[error(transparent)]
  Schnorr(#[from] schnorr::SchnorrError),
  #[error("event pubkey {event} does not belong to this signer ({signer})")]
  PubkeyMismatch { event: PubKey, signer: PubKey },
  #[error("{0} is not implemented yet")]
  NotImplemented(&'static str),
}

/// Anything able to hand out a public key and sign events with it.
///
/// Implementations must be usable from several relay tasks at once.
#[async_trait]
pub trait EventSigner: Send + Sync {
  async fn get_public_key(&self) -> Result<PubKey, Error>;

  /// Sets `pubkey` when empty, refreshes `id` and writes `sig`.
  /// Must be the last mutation applied to an event.
  async fn sign_event(&self, event: &mut Event) -> Result<(), Error>;
}

/// Holds the raw secret key in process.
pub struct LocalSigner {
  secret: [u8; 32],
  public_key: PubKey,
  secp: Secp256k1<All>,
}

impl std::fmt::Debug for LocalSigner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LocalSigner")
      .field("public_key", &self.public_key)
      .finish_non_exhaustive()
  }
}

impl LocalSigner {
  /// Accepts a hex or `nsec` encoded private key.
  pub fn new(key: &str) -> Result<Self, Error> {
    let secret = keys::decode_secret_key(key)?;
    let secp = Secp256k1::new();
    let public_key = schnorr::x_only_public_key(&secp, &secret)?;
    Ok(Self {
      secret,
      public_key,
      secp,
    })
  }

  pub fn public_key(&self) -> &str {
    &self.public_key
  }
}

#[async_trait]
impl EventSigner for LocalSigner {
  async fn get_public_key(&self) -> Result<PubKey, Error> {
    Ok(self.public_key.clone())
  }

  async fn sign_event(&self, event: &mut Event) -> Result<(), Error> {
    if event.pubkey.is_empty() {
      event.pubkey = self.public_key.clone();
    } else if event.pubkey != self.public_key {
      return Err(Error::PubkeyMismatch {
        event: event.pubkey.clone(),
        signer: self.public_key.clone(),
      });
    }

    event.update_id();
    let signature = schnorr::sign_id(&self.secp, &event.id, &self.secret)?;
    event.sig = signature.to_string();
    Ok(())
  }
}

/// Placeholder for a NIP-46 remote signer. It only records where the
/// bunker lives; every call fails until the protocol is wired in.
#[derive(Debug, Clone)]
pub struct RemoteSigner {
  pub bunker_url: String,
}

impl RemoteSigner {
  pub fn new<S>(bunker_url: S) -> Self
  where
    S: Into<String>,
  {
    Self {
      bunker_url: bunker_url.into(),
    }
  }
}

#[async_trait]
impl EventSigner for RemoteSigner {
  async fn get_public_key(&self) -> Result<PubKey, Error> {
    Err(Error::NotImplemented("remote signer public key"))
  }

  async fn sign_event(&self, _event: &mut Event) -> Result<(), Error> {
    Err(Error::NotImplemented("remote signing"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::{
    kind::EventKind,
    tag::{Tag, TagKind},
  };

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  const NSEC: &str = "nsec10allq0gjx7fddtzef0ax00mdps9t2kmtrldkyjfs8l5xruwvh2dq0lhhkp";
  const PUBKEY: &str = "17162c921dc4d2518f9a101db33695df1afb56ab82f5ff3e5da6eec3ca5cd917";

  fn make_sut() -> (LocalSigner, Event) {
    let signer = LocalSigner::new(NSEC).unwrap();
    let event = Event::new_without_signature(
      String::new(),
      1700000000,
      EventKind::Picture,
      vec![Tag::single(TagKind::Title, "cat.jpg")],
      String::from("a cat"),
    );
    (signer, event)
  }

  #[tokio::test]
  async fn derives_the_public_key() {
    let (signer, _) = make_sut();
    assert_eq!(signer.get_public_key().await.unwrap(), PUBKEY);
  }

  #[tokio::test]
  async fn fills_pubkey_and_signs() {
    let (signer, mut event) = make_sut();
    signer.sign_event(&mut event).await.unwrap();

    assert_eq!(event.pubkey, PUBKEY);
    assert!(event.check_event_id());
    assert!(event.check_event_signature());
  }

  #[tokio::test]
  async fn signing_twice_is_stable() {
    let (signer, mut event) = make_sut();
    signer.sign_event(&mut event).await.unwrap();
    let first = event.clone();

    signer.sign_event(&mut event).await.unwrap();

    assert_eq!(event.id, first.id);
    assert_eq!(event.sig, first.sig);
    assert!(event.check_event_signature());
  }

  #[tokio::test]
  async fn refuses_events_of_another_author() {
    let (signer, mut event) = make_sut();
    event.pubkey = String::from("614a695bab54e8dc98946abdb8ec019599ece6dada0c23890977d0fa128081d6");
    assert!(matches!(
      signer.sign_event(&mut event).await,
      Err(Error::PubkeyMismatch { .. })
    ));
  }

  #[test]
  fn malformed_key_is_a_key_error() {
    assert!(matches!(LocalSigner::new("nsec1xyz"), Err(Error::Key(_))));
  }

  #[tokio::test]
  async fn remote_signer_is_not_implemented() {
    let signer = RemoteSigner::new("bunker://example");
    let (_, mut event) = make_sut();
    assert!(signer.get_public_key().await.is_err());
    assert!(matches!(
      signer.sign_event(&mut event).await,
      Err(Error::NotImplemented(_))
    ));
    assert!(!event.is_signed());
  }
}
