//! Blossom blob upload.
//!
//! The file is `PUT` to `{endpoint}/upload` with an `Authorization: Nostr …`
//! header holding a base64 encoded, signed kind 24242 event that names the
//! blob by its SHA256 and expires five minutes later.

use std::{path::Path, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use reqwest::{
  header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
  Body, StatusCode,
};
use serde::Deserialize;

use crate::{
  event::{
    kind::EventKind,
    tag::{Tag, TagKind},
    Event, Timestamp,
  },
  signer::{self, EventSigner},
  unix_now,
};

/// How long an upload authorization stays valid, in seconds.
pub const AUTHORIZATION_TTL: u64 = 300;

/// [`upload`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("upload request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("upload failed: {body}, code {status}")]
  Rejected { status: StatusCode, body: String },
  #[error("signing upload authorization: {0}")]
  Signer(#[from] signer::Error),
  #[error("signer did not answer within {0:?}")]
  SignerTimeout(Duration),
}

/// What the storage endpoint answers after a successful upload.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BlobDescriptor {
  pub url: String,
  #[serde(default)]
  pub sha256: Option<String>,
  #[serde(default)]
  pub size: Option<u64>,
  #[serde(default, rename = "type")]
  pub mime: Option<String>,
  /// Upload time recorded by the server, in unix seconds.
  #[serde(default)]
  pub uploaded: Option<f64>,
}

impl BlobDescriptor {
  pub fn uploaded_at(&self) -> Option<Timestamp> {
    self
      .uploaded
      .filter(|uploaded| uploaded.is_finite() && *uploaded > 0.0)
      .map(|uploaded| uploaded as Timestamp)
  }
}

#[derive(Debug, Clone)]
pub struct Uploader {
  http: reqwest::Client,
  endpoint: String,
  signer_timeout: Duration,
}

impl Uploader {
  pub fn new<S>(http: reqwest::Client, endpoint: S, signer_timeout: Duration) -> Self
  where
    S: Into<String>,
  {
    Self {
      http,
      endpoint: endpoint.into(),
      signer_timeout,
    }
  }

  pub fn upload_url(&self) -> String {
    format!("{}/upload", self.endpoint.trim_end_matches('/'))
  }

  /// Uploads the file at `path`, already fingerprinted as `mime` / `sha256`.
  /// The body is streamed from disk with an explicit `Content-Length`.
  pub async fn upload(
    &self,
    path: &Path,
    mime: &str,
    sha256: &str,
    signer: &dyn EventSigner,
  ) -> Result<BlobDescriptor, Error> {
    let authorization = self.authorization(sha256, signer).await?;
    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    let url = self.upload_url();

    info!("uploading {} ({} bytes) to {}", path.display(), size, url);
    let response = self
      .http
      .put(&url)
      .header(CONTENT_TYPE, mime)
      .header(CONTENT_LENGTH, size)
      .header(AUTHORIZATION, format!("Nostr {authorization}"))
      .body(Body::from(file))
      .send()
      .await?;

    let status = response.status();
    if !matches!(
      status,
      StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED
    ) {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Rejected { status, body });
    }

    let descriptor: BlobDescriptor = response.json().await?;
    debug!("blob descriptor: {:?}", descriptor);
    Ok(descriptor)
  }

  /// Signed authorization event, base64 encoded for the header.
  pub async fn authorization(
    &self,
    sha256: &str,
    signer: &dyn EventSigner,
  ) -> Result<String, Error> {
    let pubkey = tokio::time::timeout(self.signer_timeout, signer.get_public_key())
      .await
      .map_err(|_| Error::SignerTimeout(self.signer_timeout))??;

    let now = unix_now();
    let mut event = Event::new_without_signature(
      pubkey,
      now,
      EventKind::BlobAuthorization,
      vec![
        Tag::single(TagKind::Hashtag, "upload"),
        Tag::single(TagKind::Sha256, sha256),
        Tag::single(TagKind::Expiration, (now + AUTHORIZATION_TTL).to_string()),
      ],
      String::from("Upload file"),
    );

    tokio::time::timeout(self.signer_timeout, signer.sign_event(&mut event))
      .await
      .map_err(|_| Error::SignerTimeout(self.signer_timeout))??;

    Ok(STANDARD.encode(event.as_json()))
  }
}
