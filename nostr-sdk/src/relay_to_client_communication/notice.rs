use serde_json::{json, Value};

use super::{labelled, Error};

/// Human readable message from the relay. Logged, never acted upon.
///
/// `["NOTICE", <message>]`
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayToClientCommNotice {
  pub code: String, // "NOTICE"
  pub message: String,
}

impl RelayToClientCommNotice {
  pub fn new_notice(message: String) -> Self {
    Self {
      code: "NOTICE".to_string(),
      message,
    }
  }

  pub fn as_value(&self) -> Value {
    json!(["NOTICE", self.message])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = labelled(&msg, "NOTICE", 2)?;
    let message = serde_json::from_value(v[1].clone())?;
    Ok(Self::new_notice(message))
  }
}
