use catena_task::{
  ExecutionContext, ParseError, Payload, Task, TaskError, TaskFactory, TaskRegistry,
};
use serde_json::Value;

use crate::executor::ChainExecutor;
use crate::spec::ChainSpec;

/// A chain used as a single step of another chain.
///
/// The nested chain receives the outer step's input payload and returns its
/// own aggregate. A nested failure fails the outer step, and the reason
/// names both the outer and the inner step.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTask {
  spec: ChainSpec,
}

impl ChainTask {
  pub const TYPE: &'static str = "chain";

  pub fn new(spec: ChainSpec) -> Self {
    Self { spec }
  }
}

impl From<ChainSpec> for ChainTask {
  fn from(spec: ChainSpec) -> Self {
    Self::new(spec)
  }
}

impl Task for ChainTask {
  fn type_name(&self) -> &str {
    Self::TYPE
  }

  fn to_value(&self) -> Value {
    self.spec.to_value()
  }

  fn execute(&self, ctx: &ExecutionContext, input: &Payload) -> Result<Payload, TaskError> {
    ChainExecutor::new(&self.spec).run(ctx, input)
  }
}

/// Parses `chain` bodies through the registry it was looked up in, so nested
/// chains may use every registered type, `chain` included.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainTaskFactory;

impl TaskFactory for ChainTaskFactory {
  fn parse(&self, body: &Value, registry: &TaskRegistry) -> Result<Box<dyn Task>, ParseError> {
    let spec = ChainSpec::parse(registry, body)?;
    Ok(Box::new(ChainTask::new(spec)))
  }
}
