use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::{ParseError, TaskError, describe_json};
use crate::payload::Payload;
use crate::registry::TaskRegistry;
use crate::task::{Task, TaskFactory};

/// Task that produces a fixed, configured payload.
///
/// ```json
/// { "simple": { "foo": "bar" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleTask {
  payload: Payload,
}

impl SimpleTask {
  pub const TYPE: &'static str = "simple";

  pub fn new(payload: Payload) -> Self {
    Self { payload }
  }

  /// A task producing a single `key: value` entry.
  pub fn single(key: impl Into<String>, value: impl Into<Value>) -> Self {
    let mut payload = Payload::new();
    payload.insert(key, value);
    Self { payload }
  }

  pub fn payload(&self) -> &Payload {
    &self.payload
  }
}

impl Task for SimpleTask {
  fn type_name(&self) -> &str {
    Self::TYPE
  }

  fn to_value(&self) -> Value {
    self.payload.clone().into_value()
  }

  fn execute(&self, _ctx: &ExecutionContext, _input: &Payload) -> Result<Payload, TaskError> {
    Ok(self.payload.clone())
  }
}

/// Parses `simple` bodies. The body must be an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTaskFactory;

impl TaskFactory for SimpleTaskFactory {
  fn parse(&self, body: &Value, _registry: &TaskRegistry) -> Result<Box<dyn Task>, ParseError> {
    match Payload::try_from(body.clone()) {
      Ok(payload) => Ok(Box::new(SimpleTask::new(payload))),
      Err(other) => Err(ParseError::invalid_body(
        SimpleTask::TYPE,
        format!("expected an object, found {}", describe_json(&other)),
      )),
    }
  }
}
