//! Best-effort fan-out of one signed event to every configured relay.
use std::sync::Arc;

use futures_util::{stream::FuturesUnordered, StreamExt};
use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::{
  event::Event,
  relay::{RelayError, RelayTransport, WebSocketTransport},
};

/// Address of a relay, e.g. `wss://relay.damus.io`.
pub type RelayTarget = String;

/// What happened when publishing to one relay.
#[derive(Debug)]
pub struct RelayOutcome {
  pub relay: RelayTarget,
  pub result: Result<(), RelayError>,
}

/// Per-relay results of a broadcast, in completion order.
#[derive(Debug, Default)]
pub struct BroadcastReport {
  pub outcomes: Vec<RelayOutcome>,
}

impl BroadcastReport {
  /// Number of relays that acknowledged the event.
  pub fn accepted(&self) -> usize {
    self.outcomes.iter().filter(|o| o.result.is_ok()).count()
  }

  pub fn failed(&self) -> usize {
    self.outcomes.len() - self.accepted()
  }

  pub fn outcome(&self, relay: &str) -> Option<&RelayOutcome> {
    self.outcomes.iter().find(|o| o.relay == relay)
  }
}

/// Publishes events to many relays at once, one task per relay.
///
/// A relay that fails (or hangs) never cancels or delays the others;
/// its error only shows up in the logs and in the [`BroadcastReport`].
#[derive(Debug)]
pub struct Broadcaster<T> {
  transport: Arc<T>,
}

impl Default for Broadcaster<WebSocketTransport> {
  fn default() -> Self {
    Self::new(WebSocketTransport::default())
  }
}

impl<T> Broadcaster<T>
where
  T: RelayTransport + 'static,
{
  pub fn new(transport: T) -> Self {
    Self {
      transport: Arc::new(transport),
    }
  }

  ///
  /// Publishes `event` to every relay in `relays` concurrently and waits
  /// until every attempt finished.
  ///
  /// Never fails as a whole: the report says which relays took the event.
  /// Cancelling `cancel` aborts the attempts still in flight with
  /// [`RelayError::Cancelled`].
  ///
  pub async fn publish(
    &self,
    cancel: &CancellationToken,
    relays: &[RelayTarget],
    event: &Event,
  ) -> BroadcastReport {
    if relays.is_empty() {
      debug!("No relays to publish event {} to", event.id);
      return BroadcastReport::default();
    }

    let event = Arc::new(event.clone());

    let tasks: FuturesUnordered<_> = relays
      .iter()
      .map(|relay| {
        let transport = self.transport.clone();
        let event = event.clone();
        let cancel = cancel.clone();
        let url = relay.clone();
        let handle = tokio::spawn(async move {
          publish_to_relay(transport.as_ref(), &url, &event, &cancel).await
        });

        let relay = relay.clone();
        async move { (relay, handle.await) }
      })
      .collect();

    let outcomes: Vec<RelayOutcome> = tasks
      .map(|(relay, joined)| {
        let result = joined.unwrap_or_else(|err| Err(RelayError::TaskFailed(err.to_string())));

        match &result {
          Ok(()) => info!("Event {} published to {}", event.id, relay),
          Err(err) => error!("Could not publish event {} to {}: {}", event.id, relay, err),
        }

        RelayOutcome { relay, result }
      })
      .collect()
      .await;

    BroadcastReport { outcomes }
  }
}

/// Connect, publish, close. The connection is closed on every path once
/// it was opened.
async fn publish_to_relay<T>(
  transport: &T,
  relay: &str,
  event: &Event,
  cancel: &CancellationToken,
) -> Result<(), RelayError>
where
  T: RelayTransport + ?Sized,
{
  let mut connection = tokio::select! {
    biased;
    _ = cancel.cancelled() => return Err(RelayError::Cancelled),
    connection = transport.connect(relay) => connection?,
  };

  let result = tokio::select! {
    biased;
    _ = cancel.cancelled() => Err(RelayError::Cancelled),
    result = connection.publish(event) => result,
  };

  connection.close().await;
  result
}
