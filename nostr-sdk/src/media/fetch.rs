//! Remote media download into a scoped temporary file.

use log::{debug, info};
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::Error;

/// Downloads `url` to a temporary file that is deleted when the returned
/// handle is dropped. Partial content responses are accepted.
pub async fn download(client: &reqwest::Client, url: &str) -> Result<NamedTempFile, Error> {
  info!("downloading {}", url);
  let mut response = client.get(url).send().await?;

  let status = response.status();
  if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
    return Err(Error::DownloadStatus(status));
  }

  let temp = tempfile::Builder::new()
    .prefix("nostr-media-download-")
    .tempfile()?;
  let mut file = tokio::fs::File::from_std(temp.reopen()?);

  let mut written: u64 = 0;
  while let Some(chunk) = response.chunk().await? {
    file.write_all(&chunk).await?;
    written += chunk.len() as u64;
  }
  file.flush().await?;

  debug!("downloaded {} bytes from {} to {}", written, url, temp.path().display());
  Ok(temp)
}
