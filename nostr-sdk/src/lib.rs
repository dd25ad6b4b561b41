pub use env_logger::Env;
pub use log::{debug, error, info};

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initializes `env_logger` once per process.
///
/// `RUST_LOG` wins over `default_filter` when it is set.
pub fn init_logger(default_filter: &str) {
  INIT_LOGGER.call_once(|| {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
  });
}

pub mod broadcast;
pub mod client_to_relay_communication;
pub mod dvm;
pub mod event;
pub mod keys;
pub mod relay;
pub mod relay_to_client_communication;
pub mod schnorr;
