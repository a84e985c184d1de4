use thiserror::Error;

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// IO error when reading the settings file.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Failed to parse settings JSON.
  #[error("invalid config: {0}")]
  InvalidConfig(#[from] serde_json::Error),
}
