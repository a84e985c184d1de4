use std::fmt;

use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::{ParseError, TaskError};
use crate::payload::Payload;
use crate::registry::TaskRegistry;

/// A configured unit of work.
///
/// Tasks own their configuration and no execution state, so one instance
/// can run any number of times, from any number of threads.
pub trait Task: fmt::Debug + Send + Sync {
  /// The type name this task is registered under, e.g. "simple".
  fn type_name(&self) -> &str;

  /// The task body, in the exact shape its factory parses.
  fn to_value(&self) -> Value;

  /// Run the task against the accumulated input payload.
  fn execute(&self, ctx: &ExecutionContext, input: &Payload) -> Result<Payload, TaskError>;
}

/// Parses the body of one task type into a [`Task`].
pub trait TaskFactory: Send + Sync {
  /// Parse a task body.
  ///
  /// `registry` is the registry this factory was looked up in; task types
  /// that nest other tasks parse them through it.
  fn parse(&self, body: &Value, registry: &TaskRegistry) -> Result<Box<dyn Task>, ParseError>;
}
