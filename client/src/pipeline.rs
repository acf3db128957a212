//! One run of the tool: fingerprint, build, proof of work, sign, then hand
//! the finished event to the relay pool.
//!
//! Every cheap check (key, timestamps, URLs, relay targets) happens before
//! the first network call.

use std::{path::Path, time::Duration};

use log::{info, warn};
use nostr_media_sdk::{
  builder::{self, PictureDraft, PictureItem, VideoDraft},
  event::{Event, Timestamp},
  media::{self, fetch, Fingerprint, MediaClass},
  pool::{PublishOutcome, RelayPool},
  pow,
  signer::{EventSigner, LocalSigner},
  unix_now,
  upload::Uploader,
};

use crate::{
  cli::{CommonArgs, PictureArgs, VideoArgs},
  config::Settings,
  error::Error,
  relays,
};

/// A signed event and where it should go.
#[derive(Debug)]
pub struct Prepared {
  pub event: Event,
  pub relays: Vec<String>,
}

pub struct Pipeline {
  settings: Settings,
  signer: Box<dyn EventSigner>,
  http: reqwest::Client,
}

impl Pipeline {
  /// Decodes `key` and builds the shared HTTP client.
  pub fn new(settings: Settings, key: &str) -> Result<Self, Error> {
    let signer = LocalSigner::new(key)?;
    info!("Signing as {}", signer.public_key());
    let http = reqwest::Client::builder()
      .timeout(settings.http_timeout)
      .build()?;

    Ok(Self {
      settings,
      signer: Box::new(signer),
      http,
    })
  }

  pub async fn prepare_video(&self, args: &VideoArgs) -> Result<Prepared, Error> {
    validate_common(&args.common)?;
    let source = VideoSource::from_args(args)?;
    match source {
      VideoSource::File(file) => {
        require_file(file)?;
        builder::validate_url(&args.common.blossom)?;
      }
      VideoSource::Url(url) => {
        builder::validate_url(url)?;
      }
    }
    let relays = self.resolve_relays(&args.common, false)?;

    let media_config = self.settings.media_config();
    let (url, fingerprint, uploaded_at) = match source {
      VideoSource::File(file) => {
        let fingerprint = media::fingerprint(file, MediaClass::Video, &media_config).await?;
        let (url, uploaded_at) = self.upload(&args.common, file, &fingerprint).await?;
        (url, fingerprint, uploaded_at)
      }
      VideoSource::Url(url) => {
        let download = fetch::download(&self.http, url).await?;
        let fingerprint =
          media::fingerprint(download.path(), MediaClass::Video, &media_config).await?;
        (url.to_string(), fingerprint, None)
      }
    };

    let draft = VideoDraft {
      url,
      fingerprint,
      title: args.common.title.clone(),
      description: args.common.description.clone(),
      published_at: args.common.published_at.clone(),
      uploaded_at,
      legacy: args.legacy,
      descriptor: args.descriptor.clone(),
      duration: args.duration,
    };
    let pubkey = self.signer.get_public_key().await?;
    let event = builder::build_video(&draft, &pubkey, unix_now())?;
    let event = self.finish(event, &args.common).await?;

    Ok(Prepared { event, relays })
  }

  pub async fn prepare_picture(&self, args: &PictureArgs) -> Result<Prepared, Error> {
    validate_common(&args.common)?;
    if args.file.is_empty() && args.url.is_empty() {
      return Err(Error::Validation(String::from(
        "at least one --file or --url must be provided",
      )));
    }
    for file in &args.file {
      require_file(file)?;
    }
    if !args.file.is_empty() {
      builder::validate_url(&args.common.blossom)?;
    }
    for url in &args.url {
      builder::validate_url(url)?;
    }
    let relays = self.resolve_relays(&args.common, true)?;

    let media_config = self.settings.media_config();
    let mut items = Vec::with_capacity(args.file.len() + args.url.len());
    let mut uploaded_at = None;

    for file in &args.file {
      let fingerprint = media::fingerprint(file, MediaClass::Image, &media_config).await?;
      let (url, uploaded) = self.upload(&args.common, file, &fingerprint).await?;
      uploaded_at = uploaded.or(uploaded_at);
      items.push(PictureItem {
        url,
        name: builder::display_name(&file.to_string_lossy()),
        fingerprint,
      });
    }
    for url in &args.url {
      let download = fetch::download(&self.http, url).await?;
      let fingerprint =
        media::fingerprint(download.path(), MediaClass::Image, &media_config).await?;
      items.push(PictureItem {
        url: url.clone(),
        name: builder::display_name(url),
        fingerprint,
      });
    }

    let draft = PictureDraft {
      items,
      title: args.common.title.clone(),
      description: args.common.description.clone(),
      published_at: args.common.published_at.clone(),
      uploaded_at,
    };
    let pubkey = self.signer.get_public_key().await?;
    let event = builder::build_picture(&draft, &pubkey, unix_now())?;
    let event = self.finish(event, &args.common).await?;

    Ok(Prepared { event, relays })
  }

  pub async fn publish(&self, prepared: &Prepared) -> Vec<PublishOutcome> {
    RelayPool::new(self.settings.pool_config())
      .publish(&prepared.event, self.signer.as_ref(), &prepared.relays)
      .await
  }

  /// Uploads a fingerprinted file and checks the URL the server hands back.
  async fn upload(
    &self,
    common: &CommonArgs,
    file: &Path,
    fingerprint: &Fingerprint,
  ) -> Result<(String, Option<Timestamp>), Error> {
    let uploader = Uploader::new(
      self.http.clone(),
      common.blossom.as_str(),
      self.settings.signer_timeout,
    );
    let descriptor = uploader
      .upload(
        file,
        &fingerprint.mime,
        &fingerprint.sha256,
        self.signer.as_ref(),
      )
      .await?;
    builder::validate_url(&descriptor.url)?;
    info!("Uploaded {} to {}", file.display(), descriptor.url);

    let uploaded_at = descriptor.uploaded_at();
    Ok((descriptor.url, uploaded_at))
  }

  /// Proof of work, then the signature. Nothing touches the event after.
  async fn finish(&self, event: Event, common: &CommonArgs) -> Result<Event, Error> {
    let deadline = common.pow_timeout.map(Duration::from_secs);
    let mut event = pow::stamp_work_with_deadline(event, common.diff, deadline).await?;
    self.signer.sign_event(&mut event).await?;
    Ok(event)
  }

  /// A target that resolves to nothing is fatal for pictures and only worth
  /// a warning for videos.
  fn resolve_relays(&self, common: &CommonArgs, strict: bool) -> Result<Vec<String>, Error> {
    let relays = relays::resolve(
      &common.relay,
      common.transmit,
      &self.settings.default_relays,
    )?;
    if relays.is_empty() && !common.relay.is_empty() {
      let message = format!("no relays found in {}", common.relay.join(", "));
      if strict {
        return Err(Error::Validation(message));
      }
      warn!("{}", message);
    }
    Ok(relays)
  }
}

#[derive(Debug, Clone, Copy)]
enum VideoSource<'a> {
  File(&'a Path),
  Url(&'a str),
}

impl<'a> VideoSource<'a> {
  fn from_args(args: &'a VideoArgs) -> Result<Self, Error> {
    match (&args.file, &args.url) {
      (Some(file), None) => Ok(VideoSource::File(file)),
      (None, Some(url)) => Ok(VideoSource::Url(url)),
      _ => Err(Error::Validation(String::from(
        "exactly one of --file or --url must be provided",
      ))),
    }
  }
}

fn validate_common(common: &CommonArgs) -> Result<(), Error> {
  if u8::try_from(common.diff).is_err() {
    return Err(Error::Validation(format!(
      "difficulty {} is above the maximum of 255",
      common.diff
    )));
  }
  if let Some(published_at) = &common.published_at {
    builder::validate_published_at(published_at)?;
  }
  Ok(())
}

fn require_file(path: &Path) -> Result<(), Error> {
  if !path.is_file() {
    return Err(Error::Validation(format!("{} is not a file", path.display())));
  }
  Ok(())
}
