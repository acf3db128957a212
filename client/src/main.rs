mod cli;
mod config;
mod error;
mod pipeline;
mod relays;

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use cli::{Cli, Command};
use config::Settings;
use error::Error;
use pipeline::Pipeline;

#[tokio::main]
async fn main() {
  dotenv::dotenv().ok();
  if let Err(err) =
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init()
  {
    eprintln!("logger already initialised: {err}");
  }

  let cli = Cli::parse();
  if let Err(err) = run(cli).await {
    error!("{}", err);
    std::process::exit(err.exit_code());
  }
}

async fn run(cli: Cli) -> Result<(), Error> {
  let settings = Settings::from_env()?;

  let (pipeline, prepared) = match &cli.command {
    Command::Video(args) => {
      let pipeline = Pipeline::new(settings, &args.common.key)?;
      let prepared = pipeline.prepare_video(args).await?;
      (pipeline, prepared)
    }
    Command::Picture(args) => {
      let pipeline = Pipeline::new(settings, &args.common.key)?;
      let prepared = pipeline.prepare_picture(args).await?;
      (pipeline, prepared)
    }
  };

  println!("{}", prepared.event.as_json());

  if prepared.relays.is_empty() {
    info!("No relays given, event not published");
    return Ok(());
  }

  let outcomes = pipeline.publish(&prepared).await;
  let published = outcomes.iter().filter(|outcome| outcome.is_success()).count();
  if published == 0 {
    warn!("Event {} was not accepted by any relay", prepared.event.id);
  } else {
    info!(
      "Event {} published to {}/{} relays",
      prepared.event.id,
      published,
      outcomes.len()
    );
  }
  Ok(())
}
