use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed data passed into and produced by tasks.
///
/// Keys keep their insertion order, so a payload serializes in the order
/// its entries were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn data(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  /// Insert a value, replacing (in place) any previous value under `key`.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.insert(key.into(), value.into())
  }

  pub fn keys(&self) -> impl Iterator<Item = &String> {
    self.0.keys()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// A copy of this payload overlaid with the entries of `other`.
  /// Entries from `other` win on key collision.
  pub fn merged(&self, other: &Payload) -> Payload {
    let mut merged = self.0.clone();
    for (key, value) in &other.0 {
      merged.insert(key.clone(), value.clone());
    }
    Payload(merged)
  }

  pub fn into_value(self) -> Value {
    Value::Object(self.0)
  }
}

impl From<Map<String, Value>> for Payload {
  fn from(map: Map<String, Value>) -> Self {
    Self(map)
  }
}

impl From<Payload> for Value {
  fn from(payload: Payload) -> Self {
    payload.into_value()
  }
}

/// Only JSON objects are payloads; anything else is handed back.
impl TryFrom<Value> for Payload {
  type Error = Value;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    match value {
      Value::Object(map) => Ok(Self(map)),
      other => Err(other),
    }
  }
}
