//! Media fingerprinting.
//!
//! A fingerprint is everything an `imeta` tag needs about one file:
//! dimensions, blurhash, SHA256, byte size and the sniffed MIME type.

use std::{
  fmt,
  fs::File,
  io,
  path::{Path, PathBuf},
  time::Duration,
};

use bitcoin_hashes::{sha256, Hash};
use log::debug;

use crate::event::imeta::{Dimensions, ImetaFields};

pub mod fetch;
pub mod frame;
pub mod sniff;

/// [`media`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] io::Error),
  #[error("unknown file type")]
  UnknownType,
  #[error("expected {expected} content, found {found}")]
  TypeMismatch { expected: MediaClass, found: String },
  #[error("decoding image: {0}")]
  Decode(#[from] image::ImageError),
  #[error("generating blurhash: {0}")]
  Blurhash(String),
  #[error("extracting frame from video: {0}")]
  FrameExtraction(String),
  #[error("frame extraction timed out after {0:?}")]
  FrameExtractionTimeout(Duration),
  #[error("downloading media: {0}")]
  Download(#[from] reqwest::Error),
  #[error("failed to download media: {0}")]
  DownloadStatus(reqwest::StatusCode),
  #[error("media worker failed: {0}")]
  Worker(String),
}

impl Error {
  /// Download failures are network problems, the rest concern the file itself.
  pub fn is_network(&self) -> bool {
    matches!(self, Self::Download(_) | Self::DownloadStatus(_))
  }
}

/// What the caller expects a file to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaClass {
  Image,
  Video,
}

impl fmt::Display for MediaClass {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Image => write!(f, "image"),
      Self::Video => write!(f, "video"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
  /// Frame extractor executable, `ffmpeg` by default.
  pub ffmpeg: PathBuf,
  /// Position of the frame used for video dimensions and blurhash.
  pub frame_offset: String,
  pub extract_timeout: Duration,
}

impl Default for MediaConfig {
  fn default() -> Self {
    Self {
      ffmpeg: PathBuf::from("ffmpeg"),
      frame_offset: String::from("00:00:01.000"),
      extract_timeout: Duration::from_secs(60),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
  pub dim: Dimensions,
  pub blurhash: String,
  /// Lowercase hex SHA256 of the whole file.
  pub sha256: String,
  pub size: u64,
  pub mime: String,
}

impl Fingerprint {
  pub fn is_vertical(&self) -> bool {
    self.dim.height > self.dim.width
  }

  /// `imeta` fields for this file, served from `url`.
  pub fn imeta_fields(&self, url: &str, alt: &str) -> ImetaFields {
    ImetaFields {
      url: url.to_string(),
      mime: self.mime.clone(),
      alt: alt.to_string(),
      sha256: self.sha256.clone(),
      size: self.size,
      dim: self.dim,
      blurhash: self.blurhash.clone(),
    }
  }
}

/// Fingerprints `path`, failing when its sniffed type is not `class`.
///
/// Videos are measured on a single frame extracted at
/// [`MediaConfig::frame_offset`]; the frame file does not outlive this call.
pub async fn fingerprint(
  path: &Path,
  class: MediaClass,
  config: &MediaConfig,
) -> Result<Fingerprint, Error> {
  let mime = sniff::sniff_class(path, class)?;
  debug!("{} sniffed as {}", path.display(), mime);

  let (dim, blurhash) = match class {
    MediaClass::Image => measure_image(path.to_path_buf()).await?,
    MediaClass::Video => {
      let frame = frame::extract_frame(path, config).await?;
      measure_image(frame.path().to_path_buf()).await?
    }
  };

  let (sha256, size) = content_hash(path)?;

  Ok(Fingerprint {
    dim,
    blurhash,
    sha256,
    size,
    mime,
  })
}

/// Hex SHA256 and byte length of the whole file.
pub fn content_hash(path: &Path) -> Result<(String, u64), Error> {
  let mut file = File::open(path)?;
  let mut engine = sha256::Hash::engine();
  let size = io::copy(&mut file, &mut engine)?;
  Ok((sha256::Hash::from_engine(engine).to_string(), size))
}

async fn measure_image(path: PathBuf) -> Result<(Dimensions, String), Error> {
  tokio::task::spawn_blocking(move || {
    let img = image::ImageReader::open(&path)?
      .with_guessed_format()?
      .decode()?;
    let dim = Dimensions {
      width: img.width(),
      height: img.height(),
    };
    let blurhash = encode_blurhash(&img)?;
    Ok((dim, blurhash))
  })
  .await
  .map_err(|err| Error::Worker(err.to_string()))?
}

/// 9x7 components, swapped to 7x9 for portrait pictures.
pub fn encode_blurhash(img: &image::DynamicImage) -> Result<String, Error> {
  let (mut x, mut y) = (9, 7);
  if img.width() < img.height() {
    (x, y) = (y, x);
  }
  let rgba = img.to_rgba8();
  blurhash::encode(x, y, img.width(), img.height(), rgba.as_raw())
    .map_err(|err| Error::Blurhash(err.to_string()))
}
