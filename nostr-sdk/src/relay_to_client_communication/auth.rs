use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::{labelled, Error};

/// NIP-42 challenge. The client answers with a signed kind 22242 event
/// carrying the challenge and the relay URL.
///
/// `["AUTH", <challenge>]`
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayToClientCommAuth {
  pub code: String, // "AUTH"
  pub challenge: String,
}

impl RelayToClientCommAuth {
  pub fn new_auth(challenge: String) -> Self {
    Self {
      code: "AUTH".to_string(),
      challenge,
    }
  }

  pub fn as_value(&self) -> Value {
    json!(["AUTH", self.challenge])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = labelled(&msg, "AUTH", 2)?;
    let challenge = serde_json::from_value(v[1].clone())?;
    Ok(Self::new_auth(challenge))
  }

  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }
}

impl Serialize for RelayToClientCommAuth {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for RelayToClientCommAuth {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value: Value = Value::deserialize(deserializer)?;
    RelayToClientCommAuth::from_value(json_value).map_err(serde::de::Error::custom)
  }
}
