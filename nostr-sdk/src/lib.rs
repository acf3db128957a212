//! Building blocks for publishing picture (NIP-68) and video (NIP-71) events.
//!
//! The pipeline is strictly sequential: fingerprint the media, build the
//! event, stamp proof of work, sign, then hand the event to the [`pool`]
//! which fans it out to every relay independently.

pub mod builder;
pub mod client_to_relay_communication;
pub mod event;
pub mod keys;
pub mod media;
pub mod pool;
pub mod pow;
pub mod relay_to_client_communication;
pub mod schnorr;
pub mod signer;
pub mod upload;

/// Seconds since the unix epoch.
pub fn unix_now() -> u64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|since_the_epoch| since_the_epoch.as_secs())
    .unwrap_or_default()
}
