//! The `client -> relay` messages a publisher sends.
//!
//!  - `["EVENT", event_JSON]`: used to publish events
//!
//!  - `["AUTH", event_JSON]`: answer to a relay challenge, carrying a signed
//!       kind 22242 event (NIP-42).
//!
use serde_json::Value;

use crate::event::Event;

// Internal `client_to_relay_communication` modules
pub mod auth;
pub mod event;

/// [`ClientToRelayCommunication`] error
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

/// Event carried by a `[<code>, <event JSON>]` message.
pub(crate) fn event_from_value(msg: Value, code: &str) -> Result<Event, Error> {
  let v = msg.as_array().ok_or(Error::InvalidData)?;

  if v.len() != 2 || v[0] != code {
    return Err(Error::InvalidData);
  }

  let event: Event = serde_json::from_value(v[1].clone())?;
  Ok(event)
}

pub(crate) fn parse_json<S>(msg: S) -> Result<Value, Error>
where
  S: Into<String>,
{
  let msg: &str = &msg.into();

  if msg.is_empty() {
    return Err(Error::InvalidData);
  }

  Ok(serde_json::from_str(msg)?)
}
