//! Magic-byte MIME detection.

use std::{fs::File, io::Read, path::Path};

use super::{Error, MediaClass};

/// Enough leading bytes for every matcher `infer` knows about.
pub const SNIFF_LEN: usize = 261;

/// MIME type of the file, read from its leading bytes.
pub fn sniff_mime(path: &Path) -> Result<String, Error> {
  let mut head = Vec::with_capacity(SNIFF_LEN);
  File::open(path)?
    .take(SNIFF_LEN as u64)
    .read_to_end(&mut head)?;

  infer::get(&head)
    .map(|kind| kind.mime_type().to_string())
    .ok_or(Error::UnknownType)
}

/// Like [`sniff_mime`], but also requires the MIME family to be `class`.
pub fn sniff_class(path: &Path, class: MediaClass) -> Result<String, Error> {
  let mime = sniff_mime(path)?;
  let family = match class {
    MediaClass::Image => "image/",
    MediaClass::Video => "video/",
  };
  if !mime.starts_with(family) {
    return Err(Error::TypeMismatch {
      expected: class,
      found: mime,
    });
  }
  Ok(mime)
}
