use std::sync::Arc;

use catena_task::Task;

/// One named step of a chain.
#[derive(Debug, Clone)]
pub struct ChainStep {
  name: String,
  task: Arc<dyn Task>,
}

impl ChainStep {
  pub fn new(name: impl Into<String>, task: Arc<dyn Task>) -> Self {
    Self {
      name: name.into(),
      task,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn task(&self) -> &dyn Task {
    self.task.as_ref()
  }

  pub fn type_name(&self) -> &str {
    self.task.type_name()
  }
}

/// Steps are equal when name, task type and serialized configuration match.
impl PartialEq for ChainStep {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
      && self.type_name() == other.type_name()
      && self.task.to_value() == other.task.to_value()
  }
}

/// An ordered, immutable chain definition.
///
/// Step names are labels, not keys: they need not be unique, and a later
/// step's result replaces an earlier one with the same name in the aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainSpec {
  steps: Vec<ChainStep>,
}

impl ChainSpec {
  pub fn builder() -> ChainBuilder {
    ChainBuilder::default()
  }

  pub(crate) fn from_steps(steps: Vec<ChainStep>) -> Self {
    Self { steps }
  }

  pub fn steps(&self) -> &[ChainStep] {
    &self.steps
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(ChainStep::name)
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// Builds a [`ChainSpec`] in code.
///
/// ```ignore
/// let spec = ChainSpec::builder()
///   .add("first", SimpleTask::single("foo", "bar"))
///   .add("second", SimpleTask::single("spam", "eggs"))
///   .build();
/// ```
#[derive(Debug, Default)]
pub struct ChainBuilder {
  steps: Vec<ChainStep>,
}

impl ChainBuilder {
  pub fn add(self, name: impl Into<String>, task: impl Task + 'static) -> Self {
    self.add_shared(name, Arc::new(task))
  }

  pub fn add_shared(mut self, name: impl Into<String>, task: Arc<dyn Task>) -> Self {
    self.steps.push(ChainStep::new(name, task));
    self
  }

  pub fn build(self) -> ChainSpec {
    ChainSpec::from_steps(self.steps)
  }
}
