use std::process;

use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use shipyard_nostr_sdk::{
  broadcast::{BroadcastReport, Broadcaster},
  dvm::{self, ServiceInvocation},
  event::kind::EventKind,
  init_logger, keys,
};

mod cli;
mod config;

use cli::Cli;
use config::Config;

#[derive(thiserror::Error, Debug)]
enum Error {
  #[error(transparent)]
  Config(#[from] config::Error),
  #[error("invalid nsec: {0}")]
  Keys(#[from] keys::Error),
  #[error("could not build job request: {0}")]
  Dvm(#[from] dvm::Error),
}

/// Signs the job request described by `cli` with the configured identity.
fn build_request(cli: Cli, config: &Config) -> Result<ServiceInvocation, Error> {
  let keys = keys::Keys::from_nsec(&config.nsec)?;
  info!("Publishing as {}", keys.to_npub()?);

  Ok(dvm::build_and_sign(
    &keys,
    EventKind::from(cli.kind),
    cli.content,
    cli.timestamp,
  )?)
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<BroadcastReport, Error> {
  let config = Config::from_env()?;
  let request = build_request(cli, &config)?;

  let report = Broadcaster::default()
    .publish(&cancel, &config.relays, request.event())
    .await;

  info!(
    "Job request published with event ID: {}",
    request.event().id
  );
  Ok(report)
}

#[tokio::main]
async fn main() {
  dotenv::dotenv().ok();
  init_logger("info");

  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let _ = err.print();
      process::exit(if err.use_stderr() { 1 } else { 0 });
    }
  };

  let cancel = CancellationToken::new();
  let on_ctrl_c = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("Interrupted, cancelling pending publishes");
      on_ctrl_c.cancel();
    }
  });

  match run(cli, cancel).await {
    Ok(report) => info!(
      "{} relay(s) accepted the job request, {} failed",
      report.accepted(),
      report.failed()
    ),
    Err(err) => {
      error!("{err}");
      eprintln!("Error: {err}");
      process::exit(1);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  fn config(nsec: &str) -> Config {
    Config {
      nsec: nsec.to_string(),
      relays: vec![],
    }
  }

  fn cli() -> Cli {
    Cli::try_parse_from(["shipyard", "1700000000", "5000", "do X"]).unwrap()
  }

  #[test]
  fn builds_request_from_arguments() {
    let request = build_request(
      cli(),
      &config("nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5"),
    )
    .unwrap();

    let job = request.job_request().unwrap();
    assert_eq!(job.event().kind, EventKind::from(5000));
    assert_eq!(job.event().created_at, 1700000000);
    assert_eq!(job.event().content, "do X");
    assert_eq!(
      request.event().pubkey,
      "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e"
    );
    assert!(request.event().verify());
  }

  #[test]
  fn invalid_nsec_is_fatal() {
    let result = build_request(cli(), &config("nsec1notakey"));
    assert!(matches!(result, Err(Error::Keys(_))));
  }

  #[tokio::test]
  async fn empty_relay_list_still_completes() {
    let request = build_request(
      cli(),
      &config("nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5"),
    )
    .unwrap();

    let report = Broadcaster::default()
      .publish(&CancellationToken::new(), &[], request.event())
      .await;

    assert_eq!(report.accepted(), 0);
    assert_eq!(report.failed(), 0);
  }
}
