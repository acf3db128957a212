//! Private key normalization (NIP-19).
//!
//! Keys are accepted either as 64 hex characters or as a bech32 `nsec1…`
//! string. Anything else is rejected before the signer is built.

const NSEC_HRP: &str = "nsec";
const SECRET_KEY_LEN: usize = 32;

/// [`keys`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("private key must not be empty")]
  Empty,
  #[error("failed to decode NIP-19 key: {0}")]
  Bech32(#[from] bech32::DecodeError),
  #[error("expected an `nsec` key, got `{0}`")]
  UnexpectedPrefix(String),
  #[error("invalid hex private key: {0}")]
  Hex(#[from] hex::FromHexError),
  #[error("private key must be 32 bytes, got {0}")]
  InvalidLength(usize),
}

/// Converts a NIP-19 `nsec` key to raw key bytes. Keys without the
/// `nsec` prefix are treated as hex.
pub fn decode_secret_key(key: &str) -> Result<[u8; SECRET_KEY_LEN], Error> {
  let key = key.trim();
  if key.is_empty() {
    return Err(Error::Empty);
  }

  let bytes = if key.starts_with(NSEC_HRP) {
    let (hrp, data) = bech32::decode(key)?;
    if hrp.as_str() != NSEC_HRP {
      return Err(Error::UnexpectedPrefix(hrp.to_string()));
    }
    data
  } else {
    hex::decode(key)?
  };

  bytes
    .as_slice()
    .try_into()
    .map_err(|_| Error::InvalidLength(bytes.len()))
}
