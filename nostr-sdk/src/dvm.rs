//! NIP-90 job requests for the shipyard data vending machine.
//!
//! A job is published as two events signed by the same keys: the
//! [`JobRequest`] itself, and a [`ServiceInvocation`] wrapper that carries the
//! complete signed request (id and signature included) in its `"i"` tag.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;

use crate::{
  event::{
    self,
    kind::EventKind,
    tag::{InputType, Tag},
    Event, Timestamp,
  },
  keys::Keys,
};

/// Topics every shipyard job request is tagged with, in this order.
pub const DVM_TOPIC: &str = "dvm";
pub const SHIPYARD_TOPIC: &str = "shipyard";

/// [`dvm`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Event(#[from] event::Error),
  #[error("expected a service invocation, found kind {0}")]
  NotAServiceInvocation(EventKind),
  #[error("service invocation has no [\"i\", <event>, \"text\"] tag")]
  MissingInput,
}

#[cfg(not(test))]
fn get_time_now() -> SystemTime {
  SystemTime::now()
}

#[allow(dead_code)]
const SECONDS_AFTER_UNIX_EPOCH_FOR_TIME_NOW_CONFIG_TEST: u64 = 1700000050u64;
#[cfg(test)]
fn get_time_now() -> SystemTime {
  UNIX_EPOCH + Duration::new(SECONDS_AFTER_UNIX_EPOCH_FOR_TIME_NOW_CONFIG_TEST, 0)
}

fn get_timestamp_in_seconds() -> Timestamp {
  // A clock set before 1970 is treated as the epoch itself.
  get_time_now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or(Duration::ZERO)
    .as_secs()
}

/// The inner event: what work is requested, signed by the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest(Event);

impl JobRequest {
  /// Builds and signs a job request of `kind` with the shipyard topics.
  pub fn new(
    keys: &Keys,
    kind: EventKind,
    content: String,
    created_at: Timestamp,
  ) -> Result<Self, Error> {
    let tags = vec![
      Tag::Hashtag(DVM_TOPIC.to_string()),
      Tag::Hashtag(SHIPYARD_TOPIC.to_string()),
    ];

    let mut event = Event::new_without_signature(keys.public_key(), created_at, kind, tags, content);
    event.sign(keys)?;
    Ok(Self(event))
  }

  pub fn event(&self) -> &Event {
    &self.0
  }

  /// Exact JSON embedded in the wrapper's `"i"` tag.
  pub fn as_json(&self) -> Result<String, Error> {
    Ok(self.0.as_json()?)
  }

  pub fn from_json(json: &str) -> Result<Self, Error> {
    Ok(Self(Event::from_json(json)?))
  }
}

/// The outer event (kind 5905) that asks a service provider to run the
/// embedded [`JobRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInvocation(Event);

impl ServiceInvocation {
  /// Wraps a signed `job` and signs the wrapper, timestamped now.
  pub fn new(keys: &Keys, job: &JobRequest) -> Result<Self, Error> {
    let tags = vec![Tag::Input(job.as_json()?, InputType::Text)];

    let mut event = Event::new_without_signature(
      keys.public_key(),
      get_timestamp_in_seconds(),
      EventKind::ServiceInvocation,
      tags,
      String::new(),
    );
    event.sign(keys)?;
    Ok(Self(event))
  }

  /// Reads a received event as a service invocation.
  pub fn from_event(event: Event) -> Result<Self, Error> {
    if event.kind != EventKind::ServiceInvocation {
      return Err(Error::NotAServiceInvocation(event.kind));
    }
    Ok(Self(event))
  }

  pub fn event(&self) -> &Event {
    &self.0
  }

  pub fn into_event(self) -> Event {
    self.0
  }

  /// Decodes the job request carried by value in the `"i"` tag.
  pub fn job_request(&self) -> Result<JobRequest, Error> {
    let embedded = self
      .0
      .tags
      .iter()
      .find_map(|tag| match tag {
        Tag::Input(data, InputType::Text) => Some(data),
        _ => None,
      })
      .ok_or(Error::MissingInput)?;

    JobRequest::from_json(embedded)
  }
}

///
/// Builds a shipyard job request and wraps it in a service invocation,
/// both signed with `keys`.
///
/// Only the wrapper is returned; the request lives inside its `"i"` tag.
/// If either signature fails nothing is returned.
///
/// ## Arguments
///
/// * `keys` - Identity signing both events.
/// * `kind` - Kind of the inner request (the kind of work).
/// * `content` - Payload of the inner request.
/// * `created_at` - Timestamp of the inner request. The wrapper is stamped
///   with the current time instead.
///
pub fn build_and_sign(
  keys: &Keys,
  kind: EventKind,
  content: String,
  created_at: Timestamp,
) -> Result<ServiceInvocation, Error> {
  let job = JobRequest::new(keys, kind, content, created_at)?;
  debug!("Job request signed with id {}", job.event().id);

  ServiceInvocation::new(keys, &job)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  const NSEC: &str = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";
  const PUBKEY: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";

  fn keys() -> Keys {
    Keys::from_nsec(NSEC).unwrap()
  }

  #[test]
  fn builds_the_wrapper() {
    let wrapper = build_and_sign(&keys(), EventKind::from(5000), "do X".to_string(), 1700000000)
      .unwrap();
    let event = wrapper.event();

    assert_eq!(event.kind, EventKind::ServiceInvocation);
    assert_eq!(u64::from(event.kind), 5905);
    assert_eq!(event.content, "");
    assert_eq!(event.pubkey, PUBKEY);
    assert_eq!(event.created_at, SECONDS_AFTER_UNIX_EPOCH_FOR_TIME_NOW_CONFIG_TEST);
    assert_eq!(event.tags.len(), 1);
    assert!(event.verify());

    let raw_tag = event.tags[0].as_vec();
    assert_eq!(raw_tag.len(), 3);
    assert_eq!(raw_tag[0], "i");
    assert_eq!(raw_tag[2], "text");

    let inner = Event::from_json(raw_tag[1].clone()).unwrap();
    assert_eq!(inner.kind, EventKind::from(5000));
    assert_eq!(inner.content, "do X");
    assert_eq!(inner.created_at, 1700000000);
    assert_eq!(inner.pubkey, PUBKEY);
    assert_eq!(
      serde_json::to_string(&inner.tags).unwrap(),
      r#"[["t","dvm"],["t","shipyard"]]"#
    );
  }

  #[test]
  fn embedded_request_is_independently_valid() {
    let keys = keys();
    let job = JobRequest::new(&keys, EventKind::from(5001), "build".to_string(), 1700000000)
      .unwrap();
    let wrapper = ServiceInvocation::new(&keys, &job).unwrap();

    let embedded = wrapper.job_request().unwrap();

    assert_eq!(embedded, job);
    assert!(embedded.event().verify());
    assert_eq!(embedded.event().pubkey, wrapper.event().pubkey);
    assert_eq!(wrapper.event().tags[0].as_vec()[1], job.as_json().unwrap());
  }

  #[test]
  fn wrapper_timestamp_is_independent_of_the_request() {
    let wrapper = build_and_sign(&keys(), EventKind::from(5000), "do X".to_string(), 42).unwrap();

    assert_eq!(wrapper.job_request().unwrap().event().created_at, 42);
    assert_eq!(
      wrapper.event().created_at,
      SECONDS_AFTER_UNIX_EPOCH_FOR_TIME_NOW_CONFIG_TEST
    );
  }

  #[test]
  fn different_timestamps_produce_different_wrappers() {
    let keys = keys();
    let first = build_and_sign(&keys, EventKind::from(5000), "do X".to_string(), 1700000000)
      .unwrap();
    let second = build_and_sign(&keys, EventKind::from(5000), "do X".to_string(), 1700000001)
      .unwrap();

    // Same clock for both wrappers, so only the embedded request differs.
    assert_eq!(first.event().created_at, second.event().created_at);
    assert_ne!(first.event().tags, second.event().tags);
    assert_ne!(first.event().id, second.event().id);
    assert_ne!(first.event().sig, second.event().sig);
  }

  #[test]
  fn decodes_a_received_wrapper() {
    let wrapper = build_and_sign(&keys(), EventKind::from(5000), "do X".to_string(), 1700000000)
      .unwrap();
    let received = Event::from_json(wrapper.event().as_json().unwrap()).unwrap();

    let decoded = ServiceInvocation::from_event(received).unwrap();

    assert_eq!(decoded, wrapper);
    assert_eq!(decoded.job_request().unwrap().event().content, "do X");
  }

  #[test]
  fn rejects_events_that_are_not_wrappers() {
    let job = JobRequest::new(&keys(), EventKind::from(5000), "do X".to_string(), 1).unwrap();
    let result = ServiceInvocation::from_event(job.event().clone());
    assert!(matches!(result, Err(Error::NotAServiceInvocation(_))));
  }

  #[test]
  fn wrapper_without_input_has_no_request() {
    let keys = keys();
    let mut event = Event::new_without_signature(
      keys.public_key(),
      1,
      EventKind::ServiceInvocation,
      vec![Tag::Hashtag("dvm".to_string())],
      String::new(),
    );
    event.sign(&keys).unwrap();

    let wrapper = ServiceInvocation::from_event(event).unwrap();
    assert!(matches!(wrapper.job_request(), Err(Error::MissingInput)));
  }

  #[test]
  fn content_with_special_characters_survives_embedding() {
    let content = "line one\nline \"two\" \\ ✓".to_string();
    let wrapper = build_and_sign(&keys(), EventKind::from(5000), content.clone(), 1).unwrap();

    let inner = wrapper.job_request().unwrap();
    assert_eq!(inner.event().content, content);
    assert!(inner.event().verify());
  }
}
