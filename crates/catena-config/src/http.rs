use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Defaults applied to every `http` task unless the task overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
  /// Time allowed to establish a connection, in milliseconds.
  pub connection_timeout_ms: u64,

  /// Time allowed for the whole request/response exchange, in milliseconds.
  pub read_timeout_ms: u64,

  /// Value of the `User-Agent` header.
  /// If not specified, `catena/<version>` is sent.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,
}

impl HttpConfig {
  pub fn connection_timeout(&self) -> Duration {
    Duration::from_millis(self.connection_timeout_ms)
  }

  pub fn read_timeout(&self) -> Duration {
    Duration::from_millis(self.read_timeout_ms)
  }

  pub fn user_agent(&self) -> String {
    self
      .user_agent
      .clone()
      .unwrap_or_else(|| format!("catena/{}", env!("CARGO_PKG_VERSION")))
  }
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      connection_timeout_ms: DEFAULT_TIMEOUT_MS,
      read_timeout_ms: DEFAULT_TIMEOUT_MS,
      user_agent: None,
    }
  }
}
