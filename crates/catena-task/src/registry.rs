use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::task::{Task, TaskFactory};

/// Lookup table from task type name to the factory that parses it.
///
/// Populate it once at startup; afterwards it is only read, and can be
/// shared across threads behind an `Arc` without locking.
#[derive(Default)]
pub struct TaskRegistry {
  factories: HashMap<String, Box<dyn TaskFactory>>,
}

impl TaskRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a factory under `type_name`.
  ///
  /// Tasks produced by the factory must report the same type name, so that
  /// serialized chains parse back through this entry.
  /// A second registration under the same name replaces the first.
  pub fn register(
    &mut self,
    type_name: impl Into<String>,
    factory: impl TaskFactory + 'static,
  ) -> &mut Self {
    let type_name = type_name.into();
    debug!(type_name = %type_name, "registering task type");
    if self
      .factories
      .insert(type_name.clone(), Box::new(factory))
      .is_some()
    {
      warn!(type_name = %type_name, "replaced previously registered task type");
    }
    self
  }

  /// Builder-style [`register`](Self::register).
  pub fn with(mut self, type_name: impl Into<String>, factory: impl TaskFactory + 'static) -> Self {
    self.register(type_name, factory);
    self
  }

  /// Get the factory for a type name.
  pub fn lookup(&self, type_name: &str) -> Result<&dyn TaskFactory, ParseError> {
    self
      .factories
      .get(type_name)
      .map(|f| f.as_ref())
      .ok_or_else(|| ParseError::UnknownType {
        type_name: type_name.to_string(),
      })
  }

  /// Look up `type_name` and parse `body` with its factory.
  pub fn parse_task(&self, type_name: &str, body: &Value) -> Result<Box<dyn Task>, ParseError> {
    self.lookup(type_name)?.parse(body, self)
  }

  pub fn contains(&self, type_name: &str) -> bool {
    self.factories.contains_key(type_name)
  }

  /// Registered type names, sorted.
  pub fn type_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  pub fn len(&self) -> usize {
    self.factories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.factories.is_empty()
  }
}

impl fmt::Debug for TaskRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskRegistry")
      .field("types", &self.type_names())
      .finish()
  }
}
