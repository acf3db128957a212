//! Proof of work (NIP-13).
//!
//! The stamper appends a `["nonce", <n>, <target>]` tag and bumps `<n>`
//! until the event id starts with at least `<target>` zero bits. There is no
//! attempt limit; callers bound the search with a cancellation flag.

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};
use std::time::Duration;

use log::{debug, info};

use crate::event::{tag::Tag, Event};

/// How many attempts run between two polls of the cancellation flag.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// [`pow`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("event id is not valid hex: {0}")]
  InvalidId(#[from] hex::FromHexError),
  #[error("difficulty {0} does not fit a nonce tag (max 255)")]
  DifficultyTooHigh(u32),
  #[error("nonce space exhausted")]
  NonceExhausted,
  #[error("proof of work cancelled after {0} attempts")]
  Cancelled(u64),
  #[error("proof of work worker failed: {0}")]
  Worker(String),
}

/// Leading zero bits of a hex encoded id, reading it as a big-endian bit string.
pub fn count_leading_zero_bits(id: &str) -> Result<u32, Error> {
  let bytes = hex::decode(id)?;
  let mut total = 0;
  for byte in bytes {
    if byte == 0 {
      total += 8;
      continue;
    }
    total += byte.leading_zeros();
    break;
  }
  Ok(total)
}

/// Runs the nonce search in place. Returns the winning nonce, or `None` when
/// `target_bits` is zero and the event was left untouched.
pub fn stamp_work(
  event: &mut Event,
  target_bits: u32,
  cancel: &AtomicBool,
) -> Result<Option<u64>, Error> {
  if target_bits == 0 {
    return Ok(None);
  }
  let difficulty =
    u8::try_from(target_bits).map_err(|_| Error::DifficultyTooHigh(target_bits))?;

  let started_at = std::time::Instant::now();
  event.tags.push(Tag::Nonce {
    nonce: 0,
    difficulty,
  });
  let nonce_index = event.tags.len() - 1;

  let mut nonce: u64 = 0;
  loop {
    event.tags[nonce_index] = Tag::Nonce { nonce, difficulty };
    let id = event.compute_id();

    if count_leading_zero_bits(&id.0)? >= target_bits {
      event.id = id.0;
      event.sig.clear();
      info!(
        "proof of work {} reached after {} attempts in {:?}",
        target_bits,
        nonce + 1,
        started_at.elapsed()
      );
      return Ok(Some(nonce));
    }

    if nonce % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
      event.tags.remove(nonce_index);
      event.update_id();
      return Err(Error::Cancelled(nonce + 1));
    }

    nonce = nonce.checked_add(1).ok_or(Error::NonceExhausted)?;
  }
}

/// Runs [`stamp_work`] on a blocking worker. With a `deadline`, the search is
/// cancelled once it elapses and [`Error::Cancelled`] is returned.
pub async fn stamp_work_with_deadline(
  mut event: Event,
  target_bits: u32,
  deadline: Option<Duration>,
) -> Result<Event, Error> {
  if target_bits == 0 {
    return Ok(event);
  }

  let cancel = Arc::new(AtomicBool::new(false));
  let worker_cancel = cancel.clone();
  let worker = tokio::task::spawn_blocking(move || {
    stamp_work(&mut event, target_bits, &worker_cancel).map(|_| event)
  });

  let watchdog = deadline.map(|deadline| {
    let cancel = cancel.clone();
    tokio::spawn(async move {
      tokio::time::sleep(deadline).await;
      debug!("proof of work deadline of {:?} elapsed", deadline);
      cancel.store(true, Ordering::Relaxed);
    })
  });

  let result = worker
    .await
    .map_err(|err| Error::Worker(err.to_string()))?;

  if let Some(watchdog) = watchdog {
    watchdog.abort();
  }
  result
}
