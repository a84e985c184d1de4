//! Chain execution result.

use catena_task::{Payload, TaskError};
use serde::{Deserialize, Serialize};

/// Outcome of a chain run: the aggregate payload, or why it failed.
///
/// Serialized form:
///
/// ```json
/// { "status": "success", "payload": { "first": { "foo": "bar" } } }
/// { "status": "failure", "reason": "ExecutionError[input [first] of type [x] failed: boom]" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainResult {
  /// Every step succeeded; each step's output is stored under its name.
  Success { payload: Payload },
  /// A step failed and the rest were skipped. No partial payload is kept.
  Failure { reason: String },
}

impl ChainResult {
  pub fn success(payload: Payload) -> Self {
    Self::Success { payload }
  }

  /// Capture an error as `<kind>[<message>]`.
  pub fn failure(error: &TaskError) -> Self {
    Self::Failure {
      reason: error.detailed_message(),
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, Self::Success { .. })
  }

  pub fn payload(&self) -> Option<&Payload> {
    match self {
      Self::Success { payload } => Some(payload),
      Self::Failure { .. } => None,
    }
  }

  pub fn reason(&self) -> Option<&str> {
    match self {
      Self::Success { .. } => None,
      Self::Failure { reason } => Some(reason),
    }
  }

  pub fn into_result(self) -> Result<Payload, String> {
    match self {
      Self::Success { payload } => Ok(payload),
      Self::Failure { reason } => Err(reason),
    }
  }
}
