use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::http::HttpConfig;

/// Top-level runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatenaConfig {
  pub http: HttpConfig,
  pub log: LogConfig,
}

/// Logging settings for the `catena` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// `tracing-subscriber` filter directive, e.g. "info" or "catena_chain=debug".
  /// `RUST_LOG` takes precedence when set.
  pub filter: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      filter: "info".to_string(),
    }
  }
}

impl CatenaConfig {
  /// Parse settings from a JSON string.
  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Load settings from a JSON file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Self::from_json_str(&content)
  }

  /// Load settings from `path` if it exists, otherwise use defaults.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
      Self::load(path)
    } else {
      Ok(Self::default())
    }
  }
}
