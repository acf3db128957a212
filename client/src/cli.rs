use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_BLOSSOM: &str = "https://cdn.nostrcheck.me";
pub const DEFAULT_DIFFICULTY: u32 = 16;

#[derive(Debug, Parser)]
#[command(name = "nostr-media", version)]
#[command(about = "Build, sign and publish Nostr picture (NIP-68) and video (NIP-71) events")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Publish a video event (kind 21/22, or 34235/34236 with --legacy)
  Video(VideoArgs),
  /// Publish a picture event (kind 20) with one or more pictures
  Picture(PictureArgs),
}

/// Flags shared by both commands.
#[derive(Debug, Args)]
pub struct CommonArgs {
  /// Private key, hex or nsec
  #[arg(long, env = "NOSTR_MEDIA_KEY", hide_env_values = true)]
  pub key: String,

  /// Event title
  #[arg(long)]
  pub title: Option<String>,

  /// Event content. #hashtags become `t` tags
  #[arg(long, default_value = "")]
  pub description: String,

  /// Publication time in unix seconds (defaults to the upload time, then now)
  #[arg(long, alias = "published_at")]
  pub published_at: Option<String>,

  /// Relay URI (ws:// or wss://) or path to a JSON array of relay URIs.
  /// May be repeated; the first target that resolves to any relay wins
  #[arg(long, short = 'r')]
  pub relay: Vec<String>,

  /// Publish to the default relays when no --relay resolves
  #[arg(long, short = 't')]
  pub transmit: bool,

  /// Blossom server used for --file uploads
  #[arg(long, default_value = DEFAULT_BLOSSOM)]
  pub blossom: String,

  /// Proof of work difficulty in leading zero bits, 0 disables it
  #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
  pub diff: u32,

  /// Give up proof of work after this many seconds
  #[arg(long, value_name = "SECS")]
  pub pow_timeout: Option<u64>,
}

#[derive(Debug, Args)]
pub struct VideoArgs {
  #[command(flatten)]
  pub common: CommonArgs,

  /// Local video, uploaded to the Blossom server
  #[arg(long, conflicts_with = "url", required_unless_present = "url")]
  pub file: Option<PathBuf>,

  /// Remote video, downloaded for fingerprinting
  #[arg(long)]
  pub url: Option<String>,

  /// Value of the `d` tag for --legacy events (defaults to the video hash)
  #[arg(long)]
  pub descriptor: Option<String>,

  /// Use the addressable 34235/34236 kinds
  #[arg(long)]
  pub legacy: bool,

  /// Duration in seconds
  #[arg(long)]
  pub duration: Option<u64>,
}

#[derive(Debug, Args)]
pub struct PictureArgs {
  #[command(flatten)]
  pub common: CommonArgs,

  /// Local picture, uploaded to the Blossom server. May be repeated
  #[arg(long, required_unless_present = "url")]
  pub file: Vec<PathBuf>,

  /// Remote picture, downloaded for fingerprinting. May be repeated
  #[arg(long)]
  pub url: Vec<String>,
}
