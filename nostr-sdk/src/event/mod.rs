use secp256k1::Secp256k1;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Event Modules
pub mod id;
pub mod imeta;
pub mod kind;
pub mod tag;

use self::id::EventId;
use self::kind::EventKind;
use self::tag::{Tag, TagKind};

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
}

///
/// Event is the only object that exists in the Nostr protocol.
///
/// Example (id's and other hashes are not valid for the information presented):
///   ```json
///   {
///     "id": "0000f2e0b8a1b33c4c0ef1e0a7a4d5f8d5c6b7a8e9f0a1b2c3d4e5f6a7b8c9d0",
///     "pubkey": "17162c921dc4d2518f9a101db33695df1afb56ab82f5ff3e5da6eec3ca5cd917",
///     "created_at": 1700000000,
///     "kind": 21,
///     "tags": [
///       ["alt", "Horizontal Video"],
///       ["title", "Sunset"],
///       ["published_at", "1700000000"],
///       ["imeta", "url https://cdn.example.com/a.mp4", "m video/mp4", "alt Horizontal Video", "x 2a…", "size 1048576", "dim 1920x1080", "blurhash LKO2?U%2Tw=w"],
///       ["nonce", "53211", "16"]
///     ],
///     "content": "Sunset over the bay",
///     "sig": "e8551d85f530113366e8da481354c2756605e3f58149cedc1fb9385d35251712b954af8ef891cb0467d50ddc6685063d4190c97e9e131f903e6e4176dc13ce7c"
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
  /// Ordered tags. Consumers match on tag name and position,
  /// so insertion order is preserved end to end.
  pub tags: Vec<Tag>,
  /// Arbitrary string. Meaning depends on the kind of the event.
  pub content: String,
  /// 64-bytes hex signature of the id field
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

  /// Id computed from the current fields, without touching `self.id`.
  pub fn compute_id(&self) -> EventId {
    EventId::new(
      &self.pubkey,
      self.created_at,
      self.kind,
      &self.tags,
      &self.content,
    )
  }

  /// Recomputes `id` after a mutation. Any previous signature no longer
  /// covers the event and is dropped.
  pub fn update_id(&mut self) {
    let id = self.compute_id().0;
    if id != self.id {
      self.id = id;
      self.sig.clear();
    }
  }

  /// Appends a tag and keeps `id` in sync.
  pub fn push_tag(&mut self, tag: Tag) {
    self.tags.push(tag);
    self.update_id();
  }

  pub fn is_signed(&self) -> bool {
    !self.sig.is_empty()
  }

  pub fn check_event_id(&self) -> bool {
    self.compute_id().0 == self.id
  }

  pub fn check_event_signature(&self) -> bool {
    let secp = Secp256k1::verification_only();
    crate::schnorr::verify_id(&secp, &self.id, &self.sig, &self.pubkey).is_ok()
  }

  /// First tag with the given name.
  pub fn find_tag(&self, kind: &TagKind) -> Option<&Tag> {
    self.tags.iter().find(|tag| tag.kind() == *kind)
  }

  /// Value of the first tag with the given name.
  pub fn tag_value(&self, kind: &TagKind) -> Option<String> {
    self.find_tag(kind).and_then(|tag| tag.value())
  }

  /// Deserializes from [`Value`]
  pub fn from_value(msg: Value) -> Result<Self, Error> {
    serde_json::from_value(msg).map_err(Error::Json)
  }

  /// Serialize as [`Value`]
  pub fn as_value(&self) -> Value {
    json!(self)
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

    let value: Value = serde_json::from_str(msg)?;
    Self::from_value(value)
  }

  /// Get [`Event`] in JSON string
  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }
}
