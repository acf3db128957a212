//! The `relay -> client` messages a publisher has to understand.
//!
//!  - `["OK", event_id, accepted, message]`: answer to an `EVENT` or `AUTH`.
//!       A rejected message starting with `auth-required:` asks the client
//!       to authenticate first (NIP-42).
//!
//!  - `["AUTH", challenge]`: challenge string to sign in a kind 22242 event.
//!
//!  - `["NOTICE", message]`: human readable message.
//!
use serde_json::Value;

// internal modules
pub mod auth;
pub mod notice;
pub mod ok;

use self::{auth::RelayToClientCommAuth, notice::RelayToClientCommNotice, ok::RelayToClientCommOk};

/// [`RelayToClientCommunication`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("Invalid data")]
  InvalidData,
}

impl serde::de::Error for Error {
  fn custom<T>(_msg: T) -> Self
  where
    T: std::fmt::Display,
  {
    Self::InvalidData
  }
}

/// Any message a relay may send while we publish.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
  Ok(RelayToClientCommOk),
  Auth(RelayToClientCommAuth),
  Notice(RelayToClientCommNotice),
  /// Well-formed but not something a publisher acts on (`EOSE`, `CLOSED`, ...).
  Other(Value),
}

impl RelayMessage {
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

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let code = msg
      .as_array()
      .and_then(|v| v.first())
      .and_then(Value::as_str)
      .map(str::to_string)
      .ok_or(Error::InvalidData)?;

    match code.as_str() {
      "OK" => RelayToClientCommOk::from_value(msg).map(Self::Ok),
      "AUTH" => RelayToClientCommAuth::from_value(msg).map(Self::Auth),
      "NOTICE" => RelayToClientCommNotice::from_value(msg).map(Self::Notice),
      _ => Ok(Self::Other(msg)),
    }
  }
}

/// Elements of `msg` when it is an array of `len` elements labelled `code`.
pub(crate) fn labelled<'a>(msg: &'a Value, code: &str, len: usize) -> Result<&'a [Value], Error> {
  let v = msg.as_array().ok_or(Error::InvalidData)?;

  if v.len() != len || v[0] != code {
    return Err(Error::InvalidData);
  }

  Ok(v.as_slice())
}
