//! Outbound connection to a single relay, used to publish one event.
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use tokio::net::TcpStream;
use tokio_tungstenite::{
  connect_async, tungstenite, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::{
  client_to_relay_communication::{self, event::ClientToRelayCommEvent},
  event::Event,
  relay_to_client_communication::RelayMessage,
};

/// How long a relay gets to answer an `EVENT` with `OK`.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(7);

/// Errors of a single relay. They never leave the task that talks to
/// that relay except as part of a broadcast report.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
  #[error("invalid relay url `{url}`: {reason}")]
  InvalidUrl { url: String, reason: String },
  #[error("could not connect: {0}")]
  Connection(#[source] tungstenite::Error),
  #[error(transparent)]
  Encode(#[from] client_to_relay_communication::Error),
  #[error("could not send event: {0}")]
  Send(#[source] tungstenite::Error),
  #[error("connection failed while waiting for OK: {0}")]
  Receive(#[source] tungstenite::Error),
  #[error("relay rejected event: {0}")]
  Rejected(String),
  #[error("connection closed before the relay acknowledged the event")]
  ConnectionClosed,
  #[error("no OK from relay within {0:?}")]
  AckTimeout(Duration),
  #[error("cancelled")]
  Cancelled,
  #[error("publish task failed: {0}")]
  TaskFailed(String),
}

/// Opens connections to relays.
#[async_trait]
pub trait RelayTransport: Send + Sync {
  async fn connect(&self, url: &str) -> Result<Box<dyn RelayConnection>, RelayError>;
}

/// An open connection to one relay.
///
/// Whoever opens a connection closes it, whether `publish` succeeded or not.
#[async_trait]
pub trait RelayConnection: Send {
  /// Sends `["EVENT", event]` and waits until the relay accepts or rejects it.
  async fn publish(&mut self, event: &Event) -> Result<(), RelayError>;

  async fn close(&mut self);
}

/// [`RelayTransport`] over WebSockets (`ws://` and `wss://`).
#[derive(Debug, Clone, Copy)]
pub struct WebSocketTransport {
  ack_timeout: Duration,
}

impl Default for WebSocketTransport {
  fn default() -> Self {
    Self::new(DEFAULT_ACK_TIMEOUT)
  }
}

impl WebSocketTransport {
  pub fn new(ack_timeout: Duration) -> Self {
    Self { ack_timeout }
  }
}

fn parse_relay_url(url: &str) -> Result<Url, RelayError> {
  let parsed = Url::parse(url).map_err(|err| RelayError::InvalidUrl {
    url: url.to_string(),
    reason: err.to_string(),
  })?;

  match parsed.scheme() {
    "ws" | "wss" => Ok(parsed),
    scheme => Err(RelayError::InvalidUrl {
      url: url.to_string(),
      reason: format!("unsupported scheme `{scheme}`"),
    }),
  }
}

#[async_trait]
impl RelayTransport for WebSocketTransport {
  async fn connect(&self, url: &str) -> Result<Box<dyn RelayConnection>, RelayError> {
    let parsed = parse_relay_url(url)?;

    debug!("❯ Connecting to {}", url);
    let (stream, _) = connect_async(parsed.as_str())
      .await
      .map_err(RelayError::Connection)?;
    info!("❯ Connected to {}", url);

    Ok(Box::new(WebSocketConnection {
      url: url.to_string(),
      stream,
      ack_timeout: self.ack_timeout,
    }))
  }
}

struct WebSocketConnection {
  url: String,
  stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
  ack_timeout: Duration,
}

/// What a text frame means for the event we are waiting on.
/// `None` means keep waiting.
fn read_ack(text: &str, event_id: &str, relay_url: &str) -> Option<Result<(), RelayError>> {
  match RelayMessage::from_json(text) {
    Ok(RelayMessage::Ok(ok)) if ok.event_id == event_id => Some(if ok.accepted {
      Ok(())
    } else {
      Err(RelayError::Rejected(ok.message))
    }),
    Ok(RelayMessage::Ok(ok)) => {
      debug!("OK for another event ({}) from {relay_url}", ok.event_id);
      None
    }
    Ok(RelayMessage::Notice(notice)) => {
      info!("NOTICE from {relay_url}: {}", notice.message);
      None
    }
    Ok(RelayMessage::Other(code)) => {
      debug!("Ignoring {code} from {relay_url}");
      None
    }
    Err(err) => {
      debug!("NO-OP from {relay_url}: {err}");
      None
    }
  }
}

impl WebSocketConnection {
  async fn wait_for_ack(&mut self, event_id: &str) -> Result<(), RelayError> {
    while let Some(frame) = self.stream.next().await {
      match frame {
        Ok(Message::Close(_)) => return Err(RelayError::ConnectionClosed),
        Ok(msg @ (Message::Text(_) | Message::Binary(_))) => {
          let Ok(text) = msg.to_text() else {
            continue;
          };
          if let Some(result) = read_ack(text, event_id, &self.url) {
            return result;
          }
        }
        Ok(_) => {}
        Err(err) => return Err(RelayError::Receive(err)),
      }
    }

    Err(RelayError::ConnectionClosed)
  }
}

#[async_trait]
impl RelayConnection for WebSocketConnection {
  async fn publish(&mut self, event: &Event) -> Result<(), RelayError> {
    let to_publish = ClientToRelayCommEvent::new_event(event.clone()).as_json()?;

    self
      .stream
      .send(Message::Text(to_publish))
      .await
      .map_err(RelayError::Send)?;
    debug!("EVENT {} sent to {}", event.id, self.url);

    let ack_timeout = self.ack_timeout;
    tokio::time::timeout(ack_timeout, self.wait_for_ack(&event.id))
      .await
      .map_err(|_| RelayError::AckTimeout(ack_timeout))?
  }

  async fn close(&mut self) {
    debug!("❯ Disconnecting from {}", self.url);
    if let Err(err) = self.stream.close(None).await {
      debug!("Closing {} did not complete cleanly: {err}", self.url);
    }
  }
}
