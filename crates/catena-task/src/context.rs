use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use crate::payload::Payload;

/// Context provided to every task of a chain run.
///
/// The chain forwards the same context to each step unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
  /// Identifier of the job (watch) that owns the chain.
  pub watch_id: String,

  /// Unique ID of this run.
  pub execution_id: String,

  /// When the run started.
  pub execution_time: DateTime<Utc>,
}

impl ExecutionContext {
  /// A context for a run starting now, with a fresh execution ID.
  pub fn new(watch_id: impl Into<String>) -> Self {
    Self {
      watch_id: watch_id.into(),
      execution_id: uuid::Uuid::new_v4().to_string(),
      execution_time: Utc::now(),
    }
  }

  pub fn with_execution_time(mut self, execution_time: DateTime<Utc>) -> Self {
    self.execution_time = execution_time;
    self
  }

  /// The data templates are rendered against:
  /// `{"ctx": {"watch_id", "execution_id", "execution_time", "payload"}}`.
  pub fn template_model(&self, payload: &Payload) -> serde_json::Value {
    json!({
      "ctx": {
        "watch_id": self.watch_id,
        "execution_id": self.execution_id,
        "execution_time": self.execution_time.to_rfc3339_opts(SecondsFormat::Millis, true),
        "payload": payload,
      }
    })
  }
}
