use bitcoin_hashes::{sha256, Hash};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{kind::EventKind, tag::Tag, Timestamp};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EventId(pub String);

impl EventId {
  ///
  /// This is the way used to serialize and get the SHA256. This will equal to `event.id`.
  /// 32-bytes lowercase hex-encoded sha256 of the the serialized event data
  ///
  /// `[0, <pubkey>, <created_at>, <kind>, <tags>, <content>]`
  ///
  /// <https://github.com/nostr-protocol/nips/blob/master/01.md>
  ///
  pub fn new(
    pubkey: &str,
    created_at: Timestamp,
    kind: EventKind,
    tags: &[Tag],
    content: &str,
  ) -> Self {
    let data = Self::serialize(pubkey, created_at, kind, tags, content);
    let hash = sha256::Hash::hash(data.as_bytes());
    Self(hash.to_string())
  }

  /// Canonical serialization the id is hashed over.
  pub fn serialize(
    pubkey: &str,
    created_at: Timestamp,
    kind: EventKind,
    tags: &[Tag],
    content: &str,
  ) -> String {
    json!([0, pubkey, created_at, kind, tags, content]).to_string()
  }
}
