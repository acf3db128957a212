use serde::de::{Deserialize, Deserializer, Error, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Defines the type of the event.
/// Different types will change the meaning of different keys
/// of event object.
/// `Text` is the default.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
  /// Plain text note.
  #[default]
  Text,
  /// NIP-68 picture-first event. One `imeta` tag per picture.
  Picture,
  /// NIP-71 horizontal video.
  Video,
  /// NIP-71 vertical (short) video.
  ShortVideo,
  /// Addressable horizontal video, the older NIP-71 layout which
  /// carries a `d` tag.
  LegacyVideo,
  /// Addressable vertical video, older NIP-71 layout.
  LegacyShortVideo,
  /// NIP-42 relay authentication response.
  ClientAuthentication,
  /// Blossom (BUD-02) upload authorization token.
  BlobAuthorization,
  /// A custom kind that we haven't implemented yet.
  Custom(u64),
}

impl EventKind {
  /// Picks the video kind for the given frame dimensions.
  /// Taller than wide means vertical, everything else is horizontal.
  pub fn for_video(width: u32, height: u32, legacy: bool) -> Self {
    let vertical = height > width;
    match (legacy, vertical) {
      (false, false) => Self::Video,
      (false, true) => Self::ShortVideo,
      (true, false) => Self::LegacyVideo,
      (true, true) => Self::LegacyShortVideo,
    }
  }

  pub fn is_vertical_video(&self) -> bool {
    matches!(self, Self::ShortVideo | Self::LegacyShortVideo)
  }

  pub fn as_u64(&self) -> u64 {
    (*self).into()
  }
}

impl FromStr for EventKind {
  type Err = ParseIntError;
  fn from_str(event_kind: &str) -> Result<Self, Self::Err> {
    let event_kind: u64 = event_kind.parse()?;
    Ok(Self::from(event_kind))
  }
}

impl From<u64> for EventKind {
  fn from(u: u64) -> Self {
    match u {
      1 => Self::Text,
      20 => Self::Picture,
      21 => Self::Video,
      22 => Self::ShortVideo,
      34235 => Self::LegacyVideo,
      34236 => Self::LegacyShortVideo,
      22242 => Self::ClientAuthentication,
      24242 => Self::BlobAuthorization,
      x => Self::Custom(x),
    }
  }
}

impl From<EventKind> for u64 {
  fn from(e: EventKind) -> u64 {
    match e {
      EventKind::Text => 1,
      EventKind::Picture => 20,
      EventKind::Video => 21,
      EventKind::ShortVideo => 22,
      EventKind::LegacyVideo => 34235,
      EventKind::LegacyShortVideo => 34236,
      EventKind::ClientAuthentication => 22242,
      EventKind::BlobAuthorization => 24242,
      EventKind::Custom(u) => u,
    }
  }
}

impl Serialize for EventKind {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_u64(From::from(*self))
  }
}

struct EventKindVisitor;

impl Visitor<'_> for EventKindVisitor {
  type Value = EventKind;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "an unsigned number of maximum length of 64 bits")
  }

  fn visit_u64<E>(self, v: u64) -> Result<EventKind, E>
  where
    E: Error,
  {
    Ok(From::<u64>::from(v))
  }
}

impl<'de> Deserialize<'de> for EventKind {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_u64(EventKindVisitor)
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.as_u64())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn horizontal_and_square_frames_select_the_horizontal_kind() {
    assert_eq!(EventKind::for_video(1920, 1080, false), EventKind::Video);
    assert_eq!(EventKind::for_video(720, 720, false), EventKind::Video);
    assert_eq!(EventKind::for_video(1920, 1080, true), EventKind::LegacyVideo);
    assert_eq!(EventKind::for_video(720, 720, true), EventKind::LegacyVideo);
  }

  #[test]
  fn taller_than_wide_selects_the_vertical_kind() {
    assert_eq!(EventKind::for_video(1080, 1920, false).as_u64(), 22);
    assert_eq!(EventKind::for_video(1080, 1920, true).as_u64(), 34236);
    assert!(EventKind::for_video(1080, 1920, true).is_vertical_video());
  }

  #[test]
  fn kinds_round_trip_through_numbers() {
    for number in [1u64, 20, 21, 22, 22242, 24242, 34235, 34236, 7] {
      assert_eq!(EventKind::from(number).as_u64(), number);
    }
    assert_eq!(EventKind::from_str("34235").unwrap(), EventKind::LegacyVideo);
    assert_eq!(serde_json::to_string(&EventKind::Picture).unwrap(), "20");
    assert_eq!(
      serde_json::from_str::<EventKind>("24242").unwrap(),
      EventKind::BlobAuthorization
    );
  }
}
