//! Relay publisher.
//!
//! Every relay gets its own short-lived websocket and its own deadline.
//! Relays are driven concurrently and never share state beyond the
//! read-only event and the signer, so one slow or failing relay cannot
//! hold back or abort the others.
//!
//! Per relay: connect, send `EVENT`, wait for `OK`. A rejection starting
//! with `auth-required:` triggers the NIP-42 handshake (sign a kind 22242
//! event for the last `AUTH` challenge, send it, wait for its `OK`) and one
//! more `EVENT` attempt. The socket is closed on every path.

use std::time::Duration;

use futures_util::{future::join_all, SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::{
  connect_async,
  tungstenite::{self, Message},
  MaybeTlsStream, WebSocketStream,
};

use crate::{
  client_to_relay_communication::{auth::ClientToRelayCommAuth, event::ClientToRelayCommEvent},
  event::Event,
  relay_to_client_communication::{ok::RelayToClientCommOk, RelayMessage},
  signer::{self, EventSigner},
  unix_now,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
  /// Bounds the websocket handshake and the first `OK`.
  pub connect_timeout: Duration,
  /// Bounds every step that involves the signer, since a delegated signer
  /// may itself go over the network.
  pub signer_timeout: Duration,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      connect_timeout: Duration::from_secs(5),
      signer_timeout: Duration::from_secs(20),
    }
  }
}

/// Why a single relay did not take the event.
#[derive(thiserror::Error, Debug)]
pub enum PublishError {
  #[error("invalid relay url: {0}")]
  InvalidUrl(String),
  #[error("connecting: {0}")]
  Connect(tungstenite::Error),
  #[error("connection not established within {0:?}")]
  ConnectTimeout(Duration),
  #[error("websocket: {0}")]
  Websocket(#[from] tungstenite::Error),
  #[error("no answer within {0:?}")]
  Timeout(Duration),
  #[error("relay closed the connection")]
  Closed,
  #[error("rejected: {0}")]
  Rejected(String),
  #[error("authentication required but the relay sent no challenge")]
  MissingChallenge,
  #[error("signing authentication: {0}")]
  Signer(#[from] signer::Error),
  #[error("signer did not answer within {0:?}")]
  SignerTimeout(Duration),
  #[error("authentication rejected: {0}")]
  AuthRejected(String),
  #[error("rejected after authentication: {0}")]
  RejectedAfterAuth(String),
}

/// How an event reached a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
  Published,
  PublishedAfterAuth,
}

#[derive(Debug)]
pub struct PublishOutcome {
  pub relay_url: String,
  pub result: Result<Delivery, PublishError>,
}

impl PublishOutcome {
  pub fn is_success(&self) -> bool {
    self.result.is_ok()
  }
}

#[derive(Debug, Default, Clone)]
pub struct RelayPool {
  config: PoolConfig,
}

impl RelayPool {
  pub fn new(config: PoolConfig) -> Self {
    Self { config }
  }

  /// Publishes `event` to every relay concurrently. Outcomes come back in
  /// the order of `relays`; duplicates are dialed independently.
  pub async fn publish(
    &self,
    event: &Event,
    signer: &dyn EventSigner,
    relays: &[String],
  ) -> Vec<PublishOutcome> {
    let tasks = relays.iter().map(|relay_url| async move {
      let result = RelaySession::publish(relay_url, event, signer, self.config).await;
      match &result {
        Ok(Delivery::Published) => info!("Published event {} to relay {}", event.id, relay_url),
        Ok(Delivery::PublishedAfterAuth) => info!(
          "Published event {} to relay {} after auth",
          event.id, relay_url
        ),
        Err(err) => error!("Error publishing event to relay {}: {}", relay_url, err),
      }
      PublishOutcome {
        relay_url: relay_url.clone(),
        result,
      }
    });

    join_all(tasks).await
  }
}

/// One connection to one relay.
struct RelaySession<'a> {
  url: &'a str,
  ws: WsStream,
  config: PoolConfig,
  /// Last `AUTH` challenge received on this connection.
  challenge: Option<String>,
}

impl<'a> RelaySession<'a> {
  async fn publish(
    url: &'a str,
    event: &Event,
    signer: &dyn EventSigner,
    config: PoolConfig,
  ) -> Result<Delivery, PublishError> {
    let mut session = Self::connect(url, config).await?;
    let result = session.deliver(event, signer).await;
    session.close().await;
    result
  }

  async fn connect(url: &'a str, config: PoolConfig) -> Result<RelaySession<'a>, PublishError> {
    let parsed = url::Url::parse(url).map_err(|err| PublishError::InvalidUrl(err.to_string()))?;
    if !matches!(parsed.scheme(), "ws" | "wss") {
      return Err(PublishError::InvalidUrl(format!(
        "unsupported scheme `{}`",
        parsed.scheme()
      )));
    }

    debug!("Connecting to {}", url);
    let (ws, _) = tokio::time::timeout(config.connect_timeout, connect_async(url))
      .await
      .map_err(|_| PublishError::ConnectTimeout(config.connect_timeout))?
      .map_err(PublishError::Connect)?;
    debug!("Connected to {}", url);

    Ok(Self {
      url,
      ws,
      config,
      challenge: None,
    })
  }

  async fn close(&mut self) {
    if let Err(err) = self.ws.close(None).await {
      debug!("closing connection to {}: {}", self.url, err);
    }
  }

  async fn deliver(
    &mut self,
    event: &Event,
    signer: &dyn EventSigner,
  ) -> Result<Delivery, PublishError> {
    let first = self.send_event(event, self.config.connect_timeout).await?;
    if first.accepted {
      return Ok(Delivery::Published);
    }
    if !first.is_auth_required() {
      return Err(PublishError::Rejected(first.message));
    }

    info!("Relay {} requires authentication: {}", self.url, first.message);
    self.authenticate(signer).await?;

    let retry = self.send_event(event, self.config.signer_timeout).await?;
    if retry.accepted {
      Ok(Delivery::PublishedAfterAuth)
    } else {
      Err(PublishError::RejectedAfterAuth(retry.message))
    }
  }

  async fn send_event(
    &mut self,
    event: &Event,
    wait: Duration,
  ) -> Result<RelayToClientCommOk, PublishError> {
    let message = ClientToRelayCommEvent::new_event(event.clone()).as_json();
    self.ws.send(Message::Text(message)).await?;
    self.wait_for_ok(&event.id, wait).await
  }

  async fn authenticate(&mut self, signer: &dyn EventSigner) -> Result<(), PublishError> {
    let wait = self.config.signer_timeout;
    let challenge = match self.challenge.clone() {
      Some(challenge) => challenge,
      None => self.wait_for_challenge(wait).await?,
    };

    let pubkey = tokio::time::timeout(wait, signer.get_public_key())
      .await
      .map_err(|_| PublishError::SignerTimeout(wait))??;
    let mut auth_event =
      ClientToRelayCommAuth::unsigned_event(pubkey, unix_now(), self.url, &challenge);
    tokio::time::timeout(wait, signer.sign_event(&mut auth_event))
      .await
      .map_err(|_| PublishError::SignerTimeout(wait))??;

    let auth_id = auth_event.id.clone();
    let message = ClientToRelayCommAuth::new_auth(auth_event).as_json();
    self.ws.send(Message::Text(message)).await?;

    let ok = self.wait_for_ok(&auth_id, wait).await?;
    if !ok.accepted {
      return Err(PublishError::AuthRejected(ok.message));
    }
    debug!("Authenticated to {}", self.url);
    Ok(())
  }

  /// Reads until the `OK` for `event_id`, remembering any `AUTH` challenge
  /// seen on the way.
  async fn wait_for_ok(
    &mut self,
    event_id: &str,
    wait: Duration,
  ) -> Result<RelayToClientCommOk, PublishError> {
    tokio::time::timeout(wait, self.read_until_ok(event_id))
      .await
      .map_err(|_| PublishError::Timeout(wait))?
  }

  async fn read_until_ok(&mut self, event_id: &str) -> Result<RelayToClientCommOk, PublishError> {
    loop {
      match self.next_message().await? {
        RelayMessage::Ok(ok) if ok.event_id == event_id => return Ok(ok),
        message => self.observe(message),
      }
    }
  }

  async fn wait_for_challenge(&mut self, wait: Duration) -> Result<String, PublishError> {
    tokio::time::timeout(wait, self.read_until_challenge())
      .await
      .map_err(|_| PublishError::MissingChallenge)?
  }

  async fn read_until_challenge(&mut self) -> Result<String, PublishError> {
    loop {
      let message = self.next_message().await?;
      self.observe(message);
      if let Some(challenge) = &self.challenge {
        return Ok(challenge.clone());
      }
    }
  }

  fn observe(&mut self, message: RelayMessage) {
    match message {
      RelayMessage::Auth(auth) => {
        debug!("{}: AUTH challenge {}", self.url, auth.challenge);
        self.challenge = Some(auth.challenge);
      }
      RelayMessage::Notice(notice) => warn!("Notice from {}: {}", self.url, notice.message),
      RelayMessage::Ok(ok) => debug!("{}: OK for another event {}", self.url, ok.as_json()),
      RelayMessage::Other(value) => debug!("{}: ignoring {}", self.url, value),
    }
  }

  /// Next relay message that parses. Control frames are skipped.
  async fn next_message(&mut self) -> Result<RelayMessage, PublishError> {
    while let Some(frame) = self.ws.next().await {
      let text = match frame? {
        Message::Text(text) => text,
        Message::Binary(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Message::Close(_) => return Err(PublishError::Closed),
        _ => continue,
      };
      match RelayMessage::from_json(text.as_str()) {
        Ok(message) => return Ok(message),
        Err(_) => debug!("{}: unparseable message {}", self.url, text),
      }
    }
    Err(PublishError::Closed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::signer::LocalSigner;

  const NSEC: &str = "nsec10allq0gjx7fddtzef0ax00mdps9t2kmtrldkyjfs8l5xruwvh2dq0lhhkp";

  #[tokio::test]
  async fn non_websocket_urls_fail_without_dialing() {
    let pool = RelayPool::default();
    let signer = LocalSigner::new(NSEC).unwrap();
    let relays = vec![
      String::from("https://relay.example.com"),
      String::from("not a url"),
    ];

    let outcomes = pool.publish(&Event::default(), &signer, &relays).await;

    assert_eq!(outcomes.len(), 2);
    for (outcome, relay_url) in outcomes.iter().zip(&relays) {
      assert_eq!(&outcome.relay_url, relay_url);
      assert!(matches!(outcome.result, Err(PublishError::InvalidUrl(_))));
    }
  }

  #[tokio::test]
  async fn empty_relay_list_publishes_nowhere() {
    let signer = LocalSigner::new(NSEC).unwrap();
    let outcomes = RelayPool::default()
      .publish(&Event::default(), &signer, &[])
      .await;
    assert!(outcomes.is_empty());
  }
}
