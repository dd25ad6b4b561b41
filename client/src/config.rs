//! Where the requester's identity and relay list come from.
use std::{
  env, fs,
  path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_PATH_VAR: &str = "NOSTR";

/// [`Config`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("environment variable {0} is not set")]
  MissingEnv(&'static str),
  #[error("could not read config file {path:?}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid config file {path:?}: {source}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

///
/// Identity and relays used to publish a job request.
///
///   ```json
///   {
///     "nsec": "nsec1...",
///     "relays": ["wss://relay.damus.io", "wss://nos.lol"]
///   }
///   ```
///
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
  pub nsec: String,
  #[serde(default)]
  pub relays: Vec<String>,
}

impl Config {
  /// Loads the file named by the `NOSTR` environment variable.
  pub fn from_env() -> Result<Self, Error> {
    Self::from_path(config_path(CONFIG_PATH_VAR)?)
  }

  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
    let path = path.as_ref();
    debug!("Loading config from {:?}", path);

    let raw = fs::read_to_string(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;

    serde_json::from_str(&raw).map_err(|source| Error::Json {
      path: path.to_path_buf(),
      source,
    })
  }
}

fn config_path(var: &'static str) -> Result<PathBuf, Error> {
  env::var_os(var)
    .filter(|value| !value.is_empty())
    .map(PathBuf::from)
    .ok_or(Error::MissingEnv(var))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("shipyard-{}-{name}.json", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn loads_identity_and_relays() {
    let path = write_temp(
      "valid",
      r#"{"nsec":"nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5","relays":["wss://relay.damus.io","wss://nos.lol"]}"#,
    );

    let config = Config::from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(
      config,
      Config {
        nsec: "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5".to_string(),
        relays: vec![
          "wss://relay.damus.io".to_string(),
          "wss://nos.lol".to_string()
        ],
      }
    );
  }

  #[test]
  fn relays_default_to_none() {
    let path = write_temp("no-relays", r#"{"nsec":"nsec1xyz"}"#);

    let config = Config::from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert!(config.relays.is_empty());
  }

  #[test]
  fn invalid_json_is_an_error() {
    let path = write_temp("broken", r#"{"nsec": "#);

    let result = Config::from_path(&path);
    fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(Error::Json { .. })));
  }

  #[test]
  fn missing_file_is_an_error() {
    let path = env::temp_dir().join("shipyard-does-not-exist.json");
    assert!(matches!(Config::from_path(path), Err(Error::Io { .. })));
  }

  #[test]
  fn unset_variable_is_an_error() {
    let result = config_path("SHIPYARD_TEST_UNSET_CONFIG_VARIABLE");
    assert!(matches!(
      result,
      Err(Error::MissingEnv("SHIPYARD_TEST_UNSET_CONFIG_VARIABLE"))
    ));
  }
}
