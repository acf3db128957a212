//! Relay target resolution.
//!
//! A target is either a relay URI or the path of a JSON file holding an
//! array of relay URIs.

use std::path::Path;

use log::{debug, warn};

use crate::error::Error;

fn is_websocket_uri(uri: &str) -> bool {
  uri.starts_with("ws://") || uri.starts_with("wss://")
}

/// Relays named by a single target. Targets that are neither a websocket
/// URI nor an existing file resolve to nothing.
pub fn load_relays(target: &str) -> Result<Vec<String>, Error> {
  if is_websocket_uri(target) {
    return Ok(vec![target.to_string()]);
  }

  let path = Path::new(target);
  if !path.is_file() {
    warn!("Relay target {} is neither a ws:// URI nor a file", target);
    return Ok(vec![]);
  }

  let relay_file_error = |reason: String| Error::RelayFile {
    path: target.to_string(),
    reason,
  };
  let content = std::fs::read_to_string(path).map_err(|err| relay_file_error(err.to_string()))?;
  let entries: Vec<String> =
    serde_json::from_str(&content).map_err(|err| relay_file_error(err.to_string()))?;

  let relays = entries
    .into_iter()
    .filter(|entry| {
      let keep = is_websocket_uri(entry);
      if !keep {
        warn!("Dropping {} from {}: not a ws:// or wss:// URI", entry, target);
      }
      keep
    })
    .collect::<Vec<_>>();
  debug!("Loaded {} relays from {}", relays.len(), target);
  Ok(relays)
}

/// The first target yielding at least one relay wins. When none does,
/// `transmit` falls back to `defaults`.
pub fn resolve(targets: &[String], transmit: bool, defaults: &[String]) -> Result<Vec<String>, Error> {
  for target in targets {
    let relays = load_relays(target)?;
    if !relays.is_empty() {
      return Ok(relays);
    }
  }

  if transmit {
    return Ok(defaults.to_vec());
  }
  Ok(vec![])
}
