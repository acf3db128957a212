use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::{labelled, Error};

/// Prefix of the rejection message asking the client to authenticate.
pub const AUTH_REQUIRED_PREFIX: &str = "auth-required:";

/// Tells the client whether an `EVENT` (or `AUTH`) was accepted.
///
/// `["OK", <event_id>, <true|false>, <message>]`
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayToClientCommOk {
  pub code: String, // "OK"
  pub event_id: String,
  pub accepted: bool,
  pub message: String,
}

impl RelayToClientCommOk {
  pub fn new_ok(event_id: String, accepted: bool, message: String) -> Self {
    Self {
      code: "OK".to_string(),
      event_id,
      accepted,
      message,
    }
  }

  /// The relay refused the event until we authenticate.
  pub fn is_auth_required(&self) -> bool {
    !self.accepted && self.message.starts_with(AUTH_REQUIRED_PREFIX)
  }

  pub fn as_value(&self) -> Value {
    json!(["OK", self.event_id, self.accepted, self.message])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    // ["OK", <event_id>, <accepted>, <message>]
    let v = labelled(&msg, "OK", 4)?;

    let event_id: String = serde_json::from_value(v[1].clone())?;
    let accepted: bool = serde_json::from_value(v[2].clone())?;
    let message: String = serde_json::from_value(v[3].clone())?;
    Ok(Self::new_ok(event_id, accepted, message))
  }

  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }

  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    let msg: &str = &msg.into();

    if msg.is_empty() {
      return Err(Error::InvalidData);
    }

    let json_value: Value = serde_json::from_str(msg)?;
    Self::from_value(json_value)
  }
}

impl Serialize for RelayToClientCommOk {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for RelayToClientCommOk {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value: Value = Value::deserialize(deserializer)?;
    RelayToClientCommOk::from_value(json_value).map_err(serde::de::Error::custom)
  }
}
