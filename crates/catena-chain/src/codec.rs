//! Reading and writing chain definitions.
//!
//! Parsing and serialization are exact inverses: every entry of `inputs`
//! is a single-field object `{name: {type_name: body}}`, in step order.

use std::path::Path;
use std::sync::Arc;

use catena_task::{ParseError, TaskRegistry, describe_json};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::spec::{ChainSpec, ChainStep};

const INPUTS_FIELD: &str = "inputs";

impl ChainSpec {
  /// Parse a chain from its structured form, resolving task types in
  /// `registry`. Any failure aborts the whole parse.
  pub fn parse(registry: &TaskRegistry, value: &Value) -> Result<Self, ParseError> {
    let object = value.as_object().ok_or_else(|| {
      ParseError::malformed(format!(
        "expected an object, found {}",
        describe_json(value)
      ))
    })?;

    if let Some(field) = object.keys().find(|key| key.as_str() != INPUTS_FIELD) {
      return Err(ParseError::UnexpectedField {
        field: field.clone(),
      });
    }

    let inputs = object
      .get(INPUTS_FIELD)
      .ok_or_else(|| ParseError::MissingField {
        field: INPUTS_FIELD.to_string(),
      })?;
    let entries = inputs.as_array().ok_or_else(|| {
      ParseError::malformed(format!(
        "expected [{}] to be an array, found {}",
        INPUTS_FIELD,
        describe_json(inputs)
      ))
    })?;

    let steps = entries
      .iter()
      .enumerate()
      .map(|(index, entry)| parse_step(registry, index, entry))
      .collect::<Result<Vec<_>, _>>()?;

    debug!(steps = steps.len(), "parsed chain");
    Ok(Self::from_steps(steps))
  }

  /// Parse a chain from JSON text.
  pub fn from_json_str(registry: &TaskRegistry, content: &str) -> Result<Self, ParseError> {
    let value: Value = serde_json::from_str(content)?;
    Self::parse(registry, &value)
  }

  /// Parse a chain from a JSON file.
  pub fn from_file(registry: &TaskRegistry, path: impl AsRef<Path>) -> Result<Self, ParseError> {
    let content = std::fs::read_to_string(path)?;
    Self::from_json_str(registry, &content)
  }

  /// The structured form, `{"inputs": [{name: {type_name: body}}, ...]}`.
  pub fn to_value(&self) -> Value {
    let inputs = self
      .steps()
      .iter()
      .map(|step| {
        let mut typed = Map::new();
        typed.insert(step.type_name().to_string(), step.task().to_value());
        let mut entry = Map::new();
        entry.insert(step.name().to_string(), Value::Object(typed));
        Value::Object(entry)
      })
      .collect();

    let mut root = Map::new();
    root.insert(INPUTS_FIELD.to_string(), Value::Array(inputs));
    Value::Object(root)
  }

  /// Compact JSON text of [`to_value`](Self::to_value).
  pub fn to_json_string(&self) -> String {
    self.to_value().to_string()
  }
}

impl Serialize for ChainSpec {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_value().serialize(serializer)
  }
}

fn parse_step(
  registry: &TaskRegistry,
  index: usize,
  entry: &Value,
) -> Result<ChainStep, ParseError> {
  let (name, typed) = single_field(entry).ok_or_else(|| {
    ParseError::malformed(format!(
      "expected input #{} to be an object with a single named field",
      index
    ))
  })?;
  let (type_name, body) = single_field(typed).ok_or_else(|| {
    ParseError::malformed(format!(
      "expected input [{}] to be an object with a single type field",
      name
    ))
  })?;

  let task = registry
    .parse_task(type_name, body)
    .map_err(|source| ParseError::Step {
      step: name.clone(),
      type_name: type_name.clone(),
      source: Box::new(source),
    })?;

  debug!(step = %name, type_name = %type_name, "parsed input");
  Ok(ChainStep::new(name.clone(), Arc::from(task)))
}

/// The only field of a one-field object.
fn single_field(value: &Value) -> Option<(&String, &Value)> {
  match value.as_object() {
    Some(object) if object.len() == 1 => object.iter().next(),
    _ => None,
  }
}
