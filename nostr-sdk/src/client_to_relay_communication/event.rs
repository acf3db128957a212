use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::event::Event;

use super::{event_from_value, parse_json, Error};

/// Publishes a signed event.
///
/// `["EVENT", <event JSON>]`
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToRelayCommEvent {
  pub code: String, // "EVENT"
  pub event: Event,
}

impl ClientToRelayCommEvent {
  pub fn new_event(event: Event) -> Self {
    Self {
      code: "EVENT".to_string(),
      event,
    }
  }

  /// Get event communication as JSON string
  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }

  /// Deserialize [`ClientToRelayCommEvent`] from JSON string
  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    Self::from_value(parse_json(msg)?)
  }

  /// Serialize as [`Value`]
  pub fn as_value(&self) -> Value {
    json!(["EVENT", self.event])
  }

  /// Deserialize from [`Value`]
  pub fn from_value(msg: Value) -> Result<Self, Error> {
    event_from_value(msg, "EVENT").map(Self::new_event)
  }
}

impl Serialize for ClientToRelayCommEvent {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ClientToRelayCommEvent {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value: Value = Value::deserialize(deserializer)?;
    ClientToRelayCommEvent::from_value(json_value).map_err(serde::de::Error::custom)
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

  fn make_sut() -> ClientToRelayCommEvent {
    ClientToRelayCommEvent::new_event(Event::new_without_signature(
      String::from("17162c921dc4d2518f9a101db33695df1afb56ab82f5ff3e5da6eec3ca5cd917"),
      1700000000,
      EventKind::ShortVideo,
      vec![
        Tag::single(TagKind::Alt, "Vertical Video"),
        Tag::Nonce {
          nonce: 776797,
          difficulty: 16,
        },
      ],
      String::from("short clip"),
    ))
  }

  #[test]
  fn wraps_the_event_in_an_array() {
    let sut = make_sut();

    let value = sut.as_value();

    assert_eq!(value[0], "EVENT");
    assert_eq!(value[1]["kind"], 22);
    assert_eq!(value[1]["tags"][1], json!(["nonce", "776797", "16"]));
  }

  #[test]
  fn parses_back_what_it_writes() {
    let sut = make_sut();
    assert_eq!(ClientToRelayCommEvent::from_json(sut.as_json()).unwrap(), sut);
  }

  #[test]
  fn rejects_other_labels() {
    let sut = make_sut();
    let auth = json!(["AUTH", sut.event]).to_string();
    assert!(ClientToRelayCommEvent::from_json(auth).is_err());
    assert!(ClientToRelayCommEvent::from_json("").is_err());
  }
}
