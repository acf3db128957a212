//! Ambient settings, read from the environment once `.env` is loaded.

use std::{path::PathBuf, time::Duration};

use nostr_media_sdk::{media::MediaConfig, pool::PoolConfig};

use crate::error::Error;

/// Relays used by `--transmit` when `NOSTR_MEDIA_DEFAULT_RELAYS` is unset.
pub const DEFAULT_RELAYS: [&str; 5] = [
  "wss://relay.primal.net",
  "wss://wot.girino.org",
  "wss://nostr.girino.org",
  "wss://haven.girino.org/outbox",
  "wss://haven.girino.org/private",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub default_relays: Vec<String>,
  pub ffmpeg: PathBuf,
  pub connect_timeout: Duration,
  pub signer_timeout: Duration,
  pub http_timeout: Duration,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      default_relays: DEFAULT_RELAYS.iter().map(|relay| relay.to_string()).collect(),
      ffmpeg: PathBuf::from("ffmpeg"),
      connect_timeout: Duration::from_secs(5),
      signer_timeout: Duration::from_secs(20),
      http_timeout: Duration::from_secs(120),
    }
  }
}

impl Settings {
  pub fn from_env() -> Result<Self, Error> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Builds settings from any key lookup. Unset or blank keys keep their
  /// default.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut settings = Self::default();
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(relays) = lookup("NOSTR_MEDIA_DEFAULT_RELAYS") {
      settings.default_relays = relays
        .split(',')
        .map(str::trim)
        .filter(|relay| !relay.is_empty())
        .map(String::from)
        .collect();
    }
    if let Some(ffmpeg) = lookup("NOSTR_MEDIA_FFMPEG") {
      settings.ffmpeg = PathBuf::from(ffmpeg);
    }
    if let Some(secs) = lookup("NOSTR_MEDIA_CONNECT_TIMEOUT_SECS") {
      settings.connect_timeout = parse_secs("NOSTR_MEDIA_CONNECT_TIMEOUT_SECS", &secs)?;
    }
    if let Some(secs) = lookup("NOSTR_MEDIA_SIGNER_TIMEOUT_SECS") {
      settings.signer_timeout = parse_secs("NOSTR_MEDIA_SIGNER_TIMEOUT_SECS", &secs)?;
    }
    if let Some(secs) = lookup("NOSTR_MEDIA_HTTP_TIMEOUT_SECS") {
      settings.http_timeout = parse_secs("NOSTR_MEDIA_HTTP_TIMEOUT_SECS", &secs)?;
    }

    Ok(settings)
  }

  pub fn media_config(&self) -> MediaConfig {
    MediaConfig {
      ffmpeg: self.ffmpeg.clone(),
      ..MediaConfig::default()
    }
  }

  pub fn pool_config(&self) -> PoolConfig {
    PoolConfig {
      connect_timeout: self.connect_timeout,
      signer_timeout: self.signer_timeout,
    }
  }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, Error> {
  value
    .trim()
    .parse::<u64>()
    .map(Duration::from_secs)
    .map_err(|_| Error::Config(format!("{key} must be a number of seconds, got `{value}`")))
}
