//! Single frame extraction from a video, through an external `ffmpeg`.

use std::{path::Path, process::Stdio};

use log::debug;
use tempfile::TempDir;
use tokio::process::Command;

use super::{Error, MediaConfig};

const FRAME_FILE_NAME: &str = "frame.jpg";

/// An extracted JPEG frame. The file and its directory are removed on drop.
#[derive(Debug)]
pub struct Frame {
  dir: TempDir,
}

impl Frame {
  pub fn path(&self) -> std::path::PathBuf {
    self.dir.path().join(FRAME_FILE_NAME)
  }
}

/// Runs `ffmpeg -i <video> -ss <offset> -vframes 1 <frame.jpg>` into a fresh
/// temporary directory. The child is killed if the timeout fires first.
pub async fn extract_frame(video: &Path, config: &MediaConfig) -> Result<Frame, Error> {
  let frame = Frame {
    dir: tempfile::Builder::new().prefix("nostr-media-frame-").tempdir()?,
  };
  let frame_path = frame.path();

  let child = Command::new(&config.ffmpeg)
    .arg("-nostdin")
    .arg("-loglevel")
    .arg("error")
    .arg("-i")
    .arg(video)
    .arg("-ss")
    .arg(&config.frame_offset)
    .arg("-vframes")
    .arg("1")
    .arg(&frame_path)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
    .map_err(|err| {
      Error::FrameExtraction(format!("spawning {}: {err}", config.ffmpeg.display()))
    })?;

  let output = tokio::time::timeout(config.extract_timeout, child.wait_with_output())
    .await
    .map_err(|_| Error::FrameExtractionTimeout(config.extract_timeout))??;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(Error::FrameExtraction(format!(
      "{} ({})",
      output.status,
      stderr.trim()
    )));
  }
  if !frame_path.is_file() {
    return Err(Error::FrameExtraction(String::from(
      "no frame was written, the video may be shorter than the frame offset",
    )));
  }

  debug!("extracted frame of {} to {}", video.display(), frame_path.display());
  Ok(frame)
}
