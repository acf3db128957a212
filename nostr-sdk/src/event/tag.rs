use serde::de::Error as DeserializerError;
use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::imeta::Imeta;

/// [`Tag`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("kind invalid or not implemented")]
  KindNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagKind {
  /// Human readable summary for clients that do not understand the kind (NIP-31).
  /// `["alt", "Vertical Video"]`
  Alt,
  /// `["title", <title>]`
  Title,
  /// Unix seconds, encoded as a string.
  /// `["published_at", "1700000000"]`
  PublishedAt,
  /// Media metadata (NIP-92), one tag per media item:
  ///
  /// `["imeta", "url https://...", "m video/mp4", ...]`
  ///
  Imeta,
  /// Identifier of an addressable event. Older video layout only.
  /// `["d", <identifier>]`
  Identifier,
  /// `["duration", <seconds>]`
  Duration,
  /// `["t", <hashtag>]`
  Hashtag,
  /// Hex SHA256 of a blob, used by upload authorization.
  /// `["x", <sha256>]`
  Sha256,
  /// `["expiration", <unix seconds>]`
  Expiration,
  /// Proof of work (NIP-13).
  /// `["nonce", <nonce>, <target difficulty>]`
  Nonce,
  /// `["relay", <relay url>]`, NIP-42 authentication.
  Relay,
  /// `["challenge", <challenge string>]`, NIP-42 authentication.
  Challenge,
  /// Custom tag
  Custom(String),
}

impl fmt::Display for TagKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Alt => write!(f, "alt"),
      Self::Title => write!(f, "title"),
      Self::PublishedAt => write!(f, "published_at"),
      Self::Imeta => write!(f, "imeta"),
      Self::Identifier => write!(f, "d"),
      Self::Duration => write!(f, "duration"),
      Self::Hashtag => write!(f, "t"),
      Self::Sha256 => write!(f, "x"),
      Self::Expiration => write!(f, "expiration"),
      Self::Nonce => write!(f, "nonce"),
      Self::Relay => write!(f, "relay"),
      Self::Challenge => write!(f, "challenge"),
      Self::Custom(tag) => write!(f, "{tag}"),
    }
  }
}

impl<S> From<S> for TagKind
where
  S: Into<String>,
{
  fn from(s: S) -> Self {
    let s: String = s.into();
    match s.as_str() {
      "alt" => Self::Alt,
      "title" => Self::Title,
      "published_at" => Self::PublishedAt,
      "imeta" => Self::Imeta,
      "d" => Self::Identifier,
      "duration" => Self::Duration,
      "t" => Self::Hashtag,
      "x" => Self::Sha256,
      "expiration" => Self::Expiration,
      "nonce" => Self::Nonce,
      "relay" => Self::Relay,
      "challenge" => Self::Challenge,
      tag => Self::Custom(tag.to_string()),
    }
  }
}

impl From<&Tag> for TagKind {
  fn from(data: &Tag) -> Self {
    match data {
      Tag::Generic(kind, _) => kind.clone(),
      Tag::Imeta(_) => TagKind::Imeta,
      Tag::Nonce { .. } => TagKind::Nonce,
    }
  }
}

/// A tag is an ordered list of strings whose first element names it.
///
///   Example:
///
///   ```json
///   ["title", "My holiday"]
///   ["imeta", "url https://cdn.example.com/a.jpg", "x 2a…", "dim 640x480", "m image/jpeg", "blurhash LKO2?U%2Tw=w"]
///   ["nonce", "776797", "16"]
///   ```
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
  /// Any tag whose values we keep as plain strings.
  Generic(TagKind, Vec<String>),
  Imeta(Imeta),
  Nonce { nonce: u64, difficulty: u8 },
}

impl Tag {
  /// Shorthand for the common `[name, value]` shape.
  pub fn single<S>(kind: TagKind, value: S) -> Self
  where
    S: Into<String>,
  {
    Self::Generic(kind, vec![value.into()])
  }

  pub fn kind(&self) -> TagKind {
    TagKind::from(self)
  }

  /// Second element of the tag, if any.
  pub fn value(&self) -> Option<String> {
    self.as_vec().get(1).cloned()
  }

  pub fn as_vec(&self) -> Vec<String> {
    self.clone().into()
  }
}

impl<S> TryFrom<Vec<S>> for Tag
where
  S: Into<String>,
{
  type Error = Error;

  fn try_from(tag: Vec<S>) -> Result<Self, Self::Error> {
    let tag: Vec<String> = tag.into_iter().map(|v| v.into()).collect();
    let tag_kind: TagKind = match tag.first() {
      Some(kind) => TagKind::from(kind),
      None => return Err(Error::KindNotFound),
    };

    match tag_kind {
      TagKind::Imeta => Ok(Self::Imeta(Imeta::from_entries(&tag[1..]))),
      TagKind::Nonce if tag.len() == 3 => {
        // A nonce tag that does not parse is kept verbatim,
        // otherwise re-serializing would change the event id.
        match (tag[1].parse::<u64>(), tag[2].parse::<u8>()) {
          (Ok(nonce), Ok(difficulty))
            if nonce.to_string() == tag[1] && difficulty.to_string() == tag[2] =>
          {
            Ok(Self::Nonce { nonce, difficulty })
          }
          _ => Ok(Self::Generic(tag_kind, tag[1..].to_vec())),
        }
      }
      _ => Ok(Self::Generic(tag_kind, tag[1..].to_vec())),
    }
  }
}

impl From<Tag> for Vec<String> {
  fn from(data: Tag) -> Self {
    match data {
      Tag::Generic(kind, content) => vec![vec![kind.to_string()], content].concat(),
      Tag::Imeta(imeta) => vec![vec![TagKind::Imeta.to_string()], imeta.as_entries()].concat(),
      Tag::Nonce { nonce, difficulty } => vec![
        TagKind::Nonce.to_string(),
        nonce.to_string(),
        difficulty.to_string(),
      ],
    }
  }
}

impl Serialize for Tag {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let data: Vec<String> = self.as_vec();
    let mut seq = serializer.serialize_seq(Some(data.len()))?;
    for element in data.iter() {
      seq.serialize_element(element)?;
    }
    seq.end()
  }
}

impl<'de> Deserialize<'de> for Tag {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    type Data = Vec<String>;
    // Deserialize into something serde already knows, then
    // use `impl<S> TryFrom<Vec<S>> for Tag` to get the enum back.
    let vec: Vec<String> = Data::deserialize(deserializer)?;
    Self::try_from(vec).map_err(DeserializerError::custom)
  }
}
