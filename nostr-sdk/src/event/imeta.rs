//! NIP-92 `imeta` tag payload.
//!
//! Each entry is serialized as a single `"key value"` string. Clients match
//! entries by key, but some only read the first occurrence, so the entry
//! order produced by the constructors below is part of the wire format.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imeta {
  entries: Vec<String>,
}

/// Dimensions of a picture or a video frame, rendered as `WxH`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Dimensions {
  pub width: u32,
  pub height: u32,
}

impl fmt::Display for Dimensions {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

/// Everything an `imeta` tag can describe about one media item.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImetaFields {
  pub url: String,
  pub mime: String,
  pub alt: String,
  pub sha256: String,
  pub size: u64,
  pub dim: Dimensions,
  pub blurhash: String,
}

impl Imeta {
  /// Video layout: `url`, `m`, `alt`, `x`, `size`, `dim`, `blurhash`.
  pub fn video(fields: &ImetaFields) -> Self {
    Self::from_pairs(vec![
      ("url", fields.url.clone()),
      ("m", fields.mime.clone()),
      ("alt", fields.alt.clone()),
      ("x", fields.sha256.clone()),
      ("size", fields.size.to_string()),
      ("dim", fields.dim.to_string()),
      ("blurhash", fields.blurhash.clone()),
    ])
  }

  /// Picture layout: `url`, `x`, `dim`, `m`, `blurhash`.
  pub fn picture(fields: &ImetaFields) -> Self {
    Self::from_pairs(vec![
      ("url", fields.url.clone()),
      ("x", fields.sha256.clone()),
      ("dim", fields.dim.to_string()),
      ("m", fields.mime.clone()),
      ("blurhash", fields.blurhash.clone()),
    ])
  }

  fn from_pairs(pairs: Vec<(&str, String)>) -> Self {
    Self {
      entries: pairs
        .into_iter()
        .map(|(key, value)| format!("{key} {value}"))
        .collect(),
    }
  }

  /// Keeps `"key value"` entries verbatim so that a parsed tag
  /// serializes back to the exact same strings.
  pub fn from_entries<S>(entries: &[S]) -> Self
  where
    S: AsRef<str>,
  {
    Self {
      entries: entries
        .iter()
        .map(|entry| entry.as_ref().to_string())
        .collect(),
    }
  }

  fn split(entry: &str) -> (&str, &str) {
    entry.split_once(' ').unwrap_or((entry, ""))
  }

  /// First value stored under `key`. The value is everything after the
  /// first space.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .map(|entry| Self::split(entry))
      .find(|(entry_key, _)| *entry_key == key)
      .map(|(_, value)| value)
  }

  pub fn keys(&self) -> Vec<&str> {
    self.entries.iter().map(|entry| Self::split(entry).0).collect()
  }

  pub fn as_entries(&self) -> Vec<String> {
    self.entries.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  fn make_sut() -> ImetaFields {
    ImetaFields {
      url: String::from("https://cdn.example.com/abc.mp4"),
      mime: String::from("video/mp4"),
      alt: String::from("Vertical Video"),
      sha256: String::from("abc"),
      size: 1024,
      dim: Dimensions {
        width: 1080,
        height: 1920,
      },
      blurhash: String::from("LEHV6nWB2yk8pyo0adR*.7kCMdnj"),
    }
  }

  #[test]
  fn video_entries_keep_their_order() {
    let imeta = Imeta::video(&make_sut());
    assert_eq!(
      imeta.as_entries(),
      vec![
        "url https://cdn.example.com/abc.mp4",
        "m video/mp4",
        "alt Vertical Video",
        "x abc",
        "size 1024",
        "dim 1080x1920",
        "blurhash LEHV6nWB2yk8pyo0adR*.7kCMdnj",
      ]
    );
  }

  #[test]
  fn picture_entries_keep_their_order() {
    let imeta = Imeta::picture(&make_sut());
    assert_eq!(imeta.keys(), vec!["url", "x", "dim", "m", "blurhash"]);
  }

  #[test]
  fn values_may_contain_spaces() {
    let imeta = Imeta::from_entries(&["alt Horizontal Video", "fallback"]);
    assert_eq!(imeta.get("alt"), Some("Horizontal Video"));
    assert_eq!(imeta.get("fallback"), Some(""));
    assert_eq!(imeta.get("url"), None);
  }
}
