use nostr_media_sdk::{builder, media, pow, signer, upload};

/// Everything that can end a run before the event is published.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("{0}")]
  Validation(String),
  #[error("configuration: {0}")]
  Config(String),
  #[error("relay list `{path}`: {reason}")]
  RelayFile { path: String, reason: String },
  #[error(transparent)]
  Builder(#[from] builder::Error),
  #[error(transparent)]
  Media(#[from] media::Error),
  #[error(transparent)]
  Upload(#[from] upload::Error),
  #[error(transparent)]
  Pow(#[from] pow::Error),
  #[error(transparent)]
  Signer(#[from] signer::Error),
  #[error("http client: {0}")]
  Http(#[from] reqwest::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub const EXIT_VALIDATION: i32 = 2;
pub const EXIT_MEDIA: i32 = 3;
pub const EXIT_NETWORK: i32 = 4;
pub const EXIT_POW_OR_SIGN: i32 = 5;

impl Error {
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::Validation(_) | Error::Config(_) | Error::RelayFile { .. } | Error::Builder(_) => {
        EXIT_VALIDATION
      }
      Error::Signer(signer::Error::Key(_)) => EXIT_VALIDATION,
      Error::Media(err) if err.is_network() => EXIT_NETWORK,
      Error::Media(_) | Error::Io(_) | Error::Upload(upload::Error::Io(_)) => EXIT_MEDIA,
      Error::Upload(upload::Error::Signer(_) | upload::Error::SignerTimeout(_)) => EXIT_POW_OR_SIGN,
      Error::Upload(_) | Error::Http(_) => EXIT_NETWORK,
      Error::Pow(_) | Error::Signer(_) => EXIT_POW_OR_SIGN,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nostr_media_sdk::keys;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn validation_family_exits_with_2() {
    let errors = [
      Error::Validation(String::from("no relay resolved")),
      Error::Config(String::from("bad timeout")),
      Error::RelayFile {
        path: String::from("relays.json"),
        reason: String::from("not an array"),
      },
      Error::Builder(builder::Error::EmptyPublishedAt),
      Error::Signer(signer::Error::Key(keys::Error::Empty)),
    ];
    for err in errors {
      assert_eq!(err.exit_code(), EXIT_VALIDATION, "{err}");
    }
  }

  #[test]
  fn media_errors_exit_with_3() {
    assert_eq!(Error::Media(media::Error::UnknownType).exit_code(), EXIT_MEDIA);
    assert_eq!(
      Error::Media(media::Error::TypeMismatch {
        expected: media::MediaClass::Video,
        found: String::from("image/png"),
      })
      .exit_code(),
      EXIT_MEDIA
    );
  }

  #[test]
  fn network_errors_exit_with_4() {
    let rejected = Error::Upload(upload::Error::Rejected {
      status: reqwest::StatusCode::PAYLOAD_TOO_LARGE,
      body: String::from("too big"),
    });
    assert_eq!(rejected.exit_code(), EXIT_NETWORK);

    let download = Error::Media(media::Error::DownloadStatus(reqwest::StatusCode::NOT_FOUND));
    assert_eq!(download.exit_code(), EXIT_NETWORK);
  }

  #[test]
  fn pow_and_signing_exit_with_5() {
    assert_eq!(Error::Pow(pow::Error::Cancelled(10)).exit_code(), EXIT_POW_OR_SIGN);
    assert_eq!(
      Error::Signer(signer::Error::NotImplemented("remote signing")).exit_code(),
      EXIT_POW_OR_SIGN
    );
  }
}
