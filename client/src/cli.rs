use clap::Parser;

/// Publishes a shipyard job request to the configured nostr relays.
#[derive(Parser, Debug)]
#[command(name = "shipyard")]
#[command(version)]
pub struct Cli {
  /// Unix timestamp (seconds) of the job request
  pub timestamp: u64,
  /// Event kind of the job request, e.g. 5000
  pub kind: u64,
  /// Content of the job request
  pub content: String,
}
