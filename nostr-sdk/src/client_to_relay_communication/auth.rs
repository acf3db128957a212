use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::event::{
  kind::EventKind,
  tag::{Tag, TagKind},
  Event, PubKey, Timestamp,
};

use super::{event_from_value, parse_json, Error};

/// Answer to a relay challenge (NIP-42).
///
/// `["AUTH", <signed kind 22242 event JSON>]`
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToRelayCommAuth {
  pub code: String, // "AUTH"
  pub event: Event,
}

impl ClientToRelayCommAuth {
  pub fn new_auth(event: Event) -> Self {
    Self {
      code: "AUTH".to_string(),
      event,
    }
  }

  /// Unsigned authentication event for `relay_url` and `challenge`.
  pub fn unsigned_event(
    pubkey: PubKey,
    created_at: Timestamp,
    relay_url: &str,
    challenge: &str,
  ) -> Event {
    Event::new_without_signature(
      pubkey,
      created_at,
      EventKind::ClientAuthentication,
      vec![
        Tag::single(TagKind::Relay, relay_url),
        Tag::single(TagKind::Challenge, challenge),
      ],
      String::new(),
    )
  }

  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }

  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    Self::from_value(parse_json(msg)?)
  }

  pub fn as_value(&self) -> Value {
    json!(["AUTH", self.event])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    event_from_value(msg, "AUTH").map(Self::new_auth)
  }
}

impl Serialize for ClientToRelayCommAuth {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}
