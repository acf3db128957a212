//! Picture (NIP-68) and video (NIP-71) event assembly.
//!
//! Tag order is part of the output: clients match on name and position.
//!
//! Video: `alt`, `title`, `published_at`, `imeta`, then `d` (older layout
//! only), `duration` and hashtags.
//! Picture: `title`, `published_at`, one `imeta` per item, then hashtags.
//!
//! Builders never sign. The returned event carries a fresh id and an empty
//! signature, ready for proof of work.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::{
  event::{
    imeta::Imeta,
    kind::EventKind,
    tag::{Tag, TagKind},
    Event, Timestamp,
  },
  media::Fingerprint,
};

/// [`builder`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("media URL cannot be empty")]
  EmptyUrl,
  #[error("invalid media URL `{url}`: {reason}")]
  InvalidUrl { url: String, reason: String },
  #[error("published_at cannot be empty")]
  EmptyPublishedAt,
  #[error("invalid published_at timestamp `{0}`")]
  InvalidPublishedAt(String),
  #[error("at least one picture is required")]
  NoMedia,
  #[error(transparent)]
  Regex(#[from] regex::Error),
}

/// Checks that `url` is an absolute URL with a host.
pub fn validate_url(url: &str) -> Result<Url, Error> {
  if url.trim().is_empty() {
    return Err(Error::EmptyUrl);
  }
  let parsed = Url::parse(url).map_err(|err| Error::InvalidUrl {
    url: url.to_string(),
    reason: err.to_string(),
  })?;
  if !parsed.has_host() {
    return Err(Error::InvalidUrl {
      url: url.to_string(),
      reason: String::from("missing host"),
    });
  }
  Ok(parsed)
}

/// Checks that `published_at` is a base-10 integer.
pub fn validate_published_at(published_at: &str) -> Result<i64, Error> {
  if published_at.is_empty() {
    return Err(Error::EmptyPublishedAt);
  }
  published_at
    .parse::<i64>()
    .map_err(|_| Error::InvalidPublishedAt(published_at.to_string()))
}

/// An explicit value wins, then the time the storage server recorded for
/// the upload, then `now`.
pub fn resolve_published_at(
  explicit: Option<&str>,
  uploaded_at: Option<Timestamp>,
  now: Timestamp,
) -> Result<String, Error> {
  match explicit {
    Some(published_at) => {
      validate_published_at(published_at)?;
      Ok(published_at.to_string())
    }
    None => Ok(uploaded_at.unwrap_or(now).to_string()),
  }
}

/// ASCII word characters only: `#café` yields `caf`.
const HASHTAG_PATTERN: &str = r"#((?-u:\w)+)";

static HASHTAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn hashtag_regex() -> Result<&'static Regex, Error> {
  if let Some(re) = HASHTAG_REGEX.get() {
    return Ok(re);
  }
  let re = Regex::new(HASHTAG_PATTERN)?;
  Ok(HASHTAG_REGEX.get_or_init(|| re))
}

/// Words prefixed with `#`, in order of appearance, without the `#`.
pub fn extract_hashtags(content: &str) -> Result<Vec<String>, Error> {
  if content.is_empty() {
    return Ok(vec![]);
  }
  let re = hashtag_regex()?;
  Ok(
    re.captures_iter(content)
      .map(|caps| caps[1].to_string())
      .collect(),
  )
}

fn hashtag_tags(content: &str) -> Result<Vec<Tag>, Error> {
  Ok(
    extract_hashtags(content)?
      .into_iter()
      .map(|hashtag| Tag::single(TagKind::Hashtag, hashtag))
      .collect(),
  )
}

#[derive(Debug, Clone)]
pub struct VideoDraft {
  /// Where the video is served from.
  pub url: String,
  pub fingerprint: Fingerprint,
  /// Defaults to `url`.
  pub title: Option<String>,
  pub description: String,
  pub published_at: Option<String>,
  pub uploaded_at: Option<Timestamp>,
  /// Addressable 34235/34236 layout instead of 21/22.
  pub legacy: bool,
  /// Overrides the `d` tag of the older layout, verbatim.
  pub descriptor: Option<String>,
  /// Seconds. Zero is left out.
  pub duration: Option<u64>,
}

pub fn build_video(
  draft: &VideoDraft,
  pubkey: &str,
  created_at: Timestamp,
) -> Result<Event, Error> {
  validate_url(&draft.url)?;
  let published_at = resolve_published_at(
    draft.published_at.as_deref(),
    draft.uploaded_at,
    created_at,
  )?;

  let fingerprint = &draft.fingerprint;
  let kind = EventKind::for_video(fingerprint.dim.width, fingerprint.dim.height, draft.legacy);
  let alt = if kind.is_vertical_video() {
    "Vertical Video"
  } else {
    "Horizontal Video"
  };
  let title = draft.title.clone().unwrap_or_else(|| draft.url.clone());

  let mut tags = vec![
    Tag::single(TagKind::Alt, alt),
    Tag::single(TagKind::Title, title),
    Tag::single(TagKind::PublishedAt, published_at),
    Tag::Imeta(Imeta::video(&fingerprint.imeta_fields(&draft.url, alt))),
  ];
  if draft.legacy {
    let identifier = draft
      .descriptor
      .clone()
      .unwrap_or_else(|| fingerprint.sha256.clone());
    tags.push(Tag::single(TagKind::Identifier, identifier));
  }
  if let Some(duration) = draft.duration.filter(|duration| *duration > 0) {
    tags.push(Tag::single(TagKind::Duration, duration.to_string()));
  }
  tags.extend(hashtag_tags(&draft.description)?);

  Ok(Event::new_without_signature(
    pubkey.to_string(),
    created_at,
    kind,
    tags,
    draft.description.clone(),
  ))
}

/// One picture of a gallery.
#[derive(Debug, Clone)]
pub struct PictureItem {
  pub url: String,
  /// File name used as the default title.
  pub name: String,
  pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone)]
pub struct PictureDraft {
  /// In `imeta` order.
  pub items: Vec<PictureItem>,
  /// Defaults to the first item's name.
  pub title: Option<String>,
  pub description: String,
  pub published_at: Option<String>,
  pub uploaded_at: Option<Timestamp>,
}

pub fn build_picture(
  draft: &PictureDraft,
  pubkey: &str,
  created_at: Timestamp,
) -> Result<Event, Error> {
  let first = draft.items.first().ok_or(Error::NoMedia)?;
  for item in &draft.items {
    validate_url(&item.url)?;
  }
  let published_at = resolve_published_at(
    draft.published_at.as_deref(),
    draft.uploaded_at,
    created_at,
  )?;
  let title = draft.title.clone().unwrap_or_else(|| first.name.clone());

  let mut tags = vec![
    Tag::single(TagKind::Title, title),
    Tag::single(TagKind::PublishedAt, published_at),
  ];
  tags.extend(
    draft
      .items
      .iter()
      .map(|item| Tag::Imeta(Imeta::picture(&item.fingerprint.imeta_fields(&item.url, "")))),
  );
  tags.extend(hashtag_tags(&draft.description)?);

  Ok(Event::new_without_signature(
    pubkey.to_string(),
    created_at,
    EventKind::Picture,
    tags,
    draft.description.clone(),
  ))
}

/// File name of a local path or the last segment of a URL path.
pub fn display_name(source: &str) -> String {
  let trimmed = source.trim_end_matches('/');
  let path = match Url::parse(trimmed) {
    Ok(url) => url.path().to_string(),
    Err(_) => trimmed.to_string(),
  };
  std::path::Path::new(&path)
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .unwrap_or_else(|| source.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::imeta::Dimensions;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  const PUBKEY: &str = "17162c921dc4d2518f9a101db33695df1afb56ab82f5ff3e5da6eec3ca5cd917";
  const NOW: Timestamp = 1700000000;

  fn fingerprint(width: u32, height: u32, mime: &str) -> Fingerprint {
    Fingerprint {
      dim: Dimensions { width, height },
      blurhash: String::from("LKO2?U%2Tw=w]~RBVZRi};RPxuwH"),
      sha256: String::from("2a3f5c9e0b8d7f6a5e4c3b2a1908f7e6d5c4b3a29180f7e6d5c4b3a291807f6e"),
      size: 1048576,
      mime: mime.to_string(),
    }
  }

  fn make_video_sut(width: u32, height: u32) -> VideoDraft {
    VideoDraft {
      url: String::from("https://cdn.example.com/sunset.mp4"),
      fingerprint: fingerprint(width, height, "video/mp4"),
      title: None,
      description: String::new(),
      published_at: None,
      uploaded_at: None,
      legacy: false,
      descriptor: None,
      duration: None,
    }
  }

  fn make_picture_sut() -> PictureDraft {
    PictureDraft {
      items: vec![PictureItem {
        url: String::from("https://cdn.example.com/abc.jpg"),
        name: String::from("cat.jpg"),
        fingerprint: fingerprint(640, 480, "image/jpeg"),
      }],
      title: None,
      description: String::new(),
      published_at: None,
      uploaded_at: None,
    }
  }

  fn tag_names(event: &Event) -> Vec<String> {
    event.tags.iter().map(|tag| tag.kind().to_string()).collect()
  }

  #[test]
  fn horizontal_video_layout() {
    let event = build_video(&make_video_sut(1920, 1080), PUBKEY, NOW).unwrap();

    assert_eq!(event.kind, EventKind::Video);
    assert_eq!(tag_names(&event), vec!["alt", "title", "published_at", "imeta"]);
    assert_eq!(event.tag_value(&TagKind::Alt).unwrap(), "Horizontal Video");
    assert_eq!(
      event.tag_value(&TagKind::Title).unwrap(),
      "https://cdn.example.com/sunset.mp4"
    );
    assert_eq!(event.tag_value(&TagKind::PublishedAt).unwrap(), "1700000000");
    assert_eq!(
      event.tags[3].as_vec(),
      vec![
        "imeta",
        "url https://cdn.example.com/sunset.mp4",
        "m video/mp4",
        "alt Horizontal Video",
        "x 2a3f5c9e0b8d7f6a5e4c3b2a1908f7e6d5c4b3a29180f7e6d5c4b3a291807f6e",
        "size 1048576",
        "dim 1920x1080",
        "blurhash LKO2?U%2Tw=w]~RBVZRi};RPxuwH",
      ]
    );
    assert!(event.check_event_id());
    assert!(!event.is_signed());
  }

  #[test]
  fn orientation_selects_the_kind() {
    let cases = [
      (1080, 1920, false, EventKind::ShortVideo),
      (1920, 1080, false, EventKind::Video),
      (1000, 1000, false, EventKind::Video),
      (1080, 1920, true, EventKind::LegacyShortVideo),
      (1920, 1080, true, EventKind::LegacyVideo),
      (1000, 1000, true, EventKind::LegacyVideo),
    ];
    for (width, height, legacy, expected) in cases {
      let mut draft = make_video_sut(width, height);
      draft.legacy = legacy;
      let event = build_video(&draft, PUBKEY, NOW).unwrap();
      assert_eq!(event.kind, expected, "{width}x{height} legacy={legacy}");
    }
  }

  #[test]
  fn vertical_video_alt_text() {
    let event = build_video(&make_video_sut(1080, 1920), PUBKEY, NOW).unwrap();
    assert_eq!(event.tag_value(&TagKind::Alt).unwrap(), "Vertical Video");
    let Tag::Imeta(imeta) = &event.tags[3] else {
      panic!("expected an imeta tag");
    };
    assert_eq!(imeta.get("alt"), Some("Vertical Video"));
  }

  #[test]
  fn legacy_identifier_defaults_to_the_content_hash() {
    let mut draft = make_video_sut(1920, 1080);
    draft.legacy = true;

    let event = build_video(&draft, PUBKEY, NOW).unwrap();

    assert_eq!(
      event.tag_value(&TagKind::Identifier).unwrap(),
      draft.fingerprint.sha256
    );
  }

  #[test]
  fn legacy_identifier_override_is_verbatim() {
    for descriptor in ["myvideo", "", "with spaces"] {
      let mut draft = make_video_sut(1080, 1920);
      draft.legacy = true;
      draft.descriptor = Some(descriptor.to_string());

      let event = build_video(&draft, PUBKEY, NOW).unwrap();

      assert_eq!(event.kind, EventKind::LegacyShortVideo);
      assert_eq!(event.tag_value(&TagKind::Identifier).unwrap(), descriptor);
    }
  }

  #[test]
  fn current_layout_has_no_identifier() {
    let mut draft = make_video_sut(1920, 1080);
    draft.descriptor = Some(String::from("myvideo"));
    let event = build_video(&draft, PUBKEY, NOW).unwrap();
    assert!(event.find_tag(&TagKind::Identifier).is_none());
  }

  #[test]
  fn duration_and_hashtags_follow_the_media_tags() {
    let mut draft = make_video_sut(1920, 1080);
    draft.legacy = true;
    draft.duration = Some(42);
    draft.description = String::from("Golden hour #sunset at the #bay");

    let event = build_video(&draft, PUBKEY, NOW).unwrap();

    assert_eq!(
      tag_names(&event),
      vec!["alt", "title", "published_at", "imeta", "d", "duration", "t", "t"]
    );
    assert_eq!(event.tag_value(&TagKind::Duration).unwrap(), "42");
    assert_eq!(event.tags[6].as_vec(), vec!["t", "sunset"]);
    assert_eq!(event.tags[7].as_vec(), vec!["t", "bay"]);
    assert_eq!(event.content, "Golden hour #sunset at the #bay");
  }

  #[test]
  fn zero_duration_is_left_out() {
    let mut draft = make_video_sut(1920, 1080);
    draft.duration = Some(0);
    let event = build_video(&draft, PUBKEY, NOW).unwrap();
    assert!(event.find_tag(&TagKind::Duration).is_none());
  }

  #[test]
  fn picture_from_a_single_file() {
    let event = build_picture(&make_picture_sut(), PUBKEY, NOW).unwrap();

    assert_eq!(event.kind, EventKind::Picture);
    assert_eq!(tag_names(&event), vec!["title", "published_at", "imeta"]);
    assert_eq!(event.tag_value(&TagKind::Title).unwrap(), "cat.jpg");
    let Tag::Imeta(imeta) = &event.tags[2] else {
      panic!("expected an imeta tag");
    };
    assert_eq!(imeta.keys(), vec!["url", "x", "dim", "m", "blurhash"]);
    assert_eq!(imeta.get("dim"), Some("640x480"));
    assert_eq!(imeta.get("m"), Some("image/jpeg"));
  }

  #[test]
  fn picture_kind_ignores_orientation() {
    let mut draft = make_picture_sut();
    draft.items[0].fingerprint = fingerprint(480, 640, "image/png");
    let event = build_picture(&draft, PUBKEY, NOW).unwrap();
    assert_eq!(event.kind, EventKind::Picture);
  }

  #[test]
  fn gallery_keeps_item_order() {
    let mut draft = make_picture_sut();
    draft.items.push(PictureItem {
      url: String::from("https://cdn.example.com/dog.png"),
      name: String::from("dog.png"),
      fingerprint: fingerprint(100, 200, "image/png"),
    });
    draft.title = Some(String::from("pets"));

    let event = build_picture(&draft, PUBKEY, NOW).unwrap();

    assert_eq!(tag_names(&event), vec!["title", "published_at", "imeta", "imeta"]);
    assert_eq!(event.tag_value(&TagKind::Title).unwrap(), "pets");
    let urls: Vec<String> = event
      .tags
      .iter()
      .filter_map(|tag| match tag {
        Tag::Imeta(imeta) => imeta.get("url").map(String::from),
        _ => None,
      })
      .collect();
    assert_eq!(
      urls,
      vec!["https://cdn.example.com/abc.jpg", "https://cdn.example.com/dog.png"]
    );
  }

  #[test]
  fn empty_gallery_is_rejected() {
    let mut draft = make_picture_sut();
    draft.items.clear();
    assert!(matches!(build_picture(&draft, PUBKEY, NOW), Err(Error::NoMedia)));
  }

  #[test]
  fn published_at_policy() {
    assert_eq!(resolve_published_at(Some("123"), Some(456), NOW).unwrap(), "123");
    assert_eq!(resolve_published_at(None, Some(456), NOW).unwrap(), "456");
    assert_eq!(resolve_published_at(None, None, NOW).unwrap(), "1700000000");
    assert!(matches!(
      resolve_published_at(Some("yesterday"), None, NOW),
      Err(Error::InvalidPublishedAt(_))
    ));
    assert!(matches!(
      resolve_published_at(Some(""), None, NOW),
      Err(Error::EmptyPublishedAt)
    ));
  }

  #[test]
  fn upload_time_becomes_published_at() {
    let mut draft = make_picture_sut();
    draft.uploaded_at = Some(1700000123);
    let event = build_picture(&draft, PUBKEY, NOW).unwrap();
    assert_eq!(event.tag_value(&TagKind::PublishedAt).unwrap(), "1700000123");
    assert_eq!(event.created_at, NOW);
  }

  #[test]
  fn url_validation() {
    assert!(validate_url("https://cdn.example.com/a.mp4").is_ok());
    assert!(matches!(validate_url(""), Err(Error::EmptyUrl)));
    assert!(matches!(validate_url("   "), Err(Error::EmptyUrl)));
    assert!(matches!(
      validate_url("/videos/a.mp4"),
      Err(Error::InvalidUrl { .. })
    ));
    assert!(matches!(
      validate_url("mailto:someone@example.com"),
      Err(Error::InvalidUrl { .. })
    ));
  }

  #[test]
  fn invalid_video_url_fails_the_build() {
    let mut draft = make_video_sut(1920, 1080);
    draft.url = String::from("not a url");
    assert!(matches!(
      build_video(&draft, PUBKEY, NOW),
      Err(Error::InvalidUrl { .. })
    ));
  }

  #[test]
  fn hashtags_are_extracted_in_order() {
    assert_eq!(
      extract_hashtags("#nostr photos of #cats, #cats_and_dogs!").unwrap(),
      vec!["nostr", "cats", "cats_and_dogs"]
    );
    assert!(extract_hashtags("no tags here").unwrap().is_empty());
    assert!(extract_hashtags("").unwrap().is_empty());
  }

  #[test]
  fn hashtags_stop_at_non_ascii_letters() {
    assert_eq!(
      extract_hashtags("#café au lait #naïve #日本 #tag2").unwrap(),
      vec!["caf", "na", "tag2"]
    );
  }

  #[test]
  fn display_names() {
    assert_eq!(display_name("/tmp/photos/cat.jpg"), "cat.jpg");
    assert_eq!(display_name("https://cdn.example.com/a/dog.png?x=1"), "dog.png");
    assert_eq!(display_name("cat.jpg"), "cat.jpg");
  }
}
