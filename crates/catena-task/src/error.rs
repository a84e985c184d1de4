use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while parsing a chain or a task body.
#[derive(Debug, Error)]
pub enum ParseError {
  /// The source text is not valid JSON.
  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),

  /// IO error when reading a chain file.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A required field is absent.
  #[error("missing required field [{field}]")]
  MissingField { field: String },

  /// A field that the shape does not allow.
  #[error("unexpected field [{field}]")]
  UnexpectedField { field: String },

  /// The structure does not match the expected shape.
  #[error("malformed chain: {message}")]
  Malformed { message: String },

  /// No factory is registered under this type name.
  #[error("no task type registered for [{type_name}]")]
  UnknownType { type_name: String },

  /// The factory rejected the task body.
  #[error("invalid [{type_name}] body: {message}")]
  InvalidBody { type_name: String, message: String },

  /// Parsing a named step failed.
  #[error("could not parse input [{step}] of type [{type_name}]: {source}")]
  Step {
    step: String,
    type_name: String,
    #[source]
    source: Box<ParseError>,
  },
}

impl ParseError {
  pub fn malformed(message: impl Into<String>) -> Self {
    Self::Malformed {
      message: message.into(),
    }
  }

  pub fn invalid_body(type_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidBody {
      type_name: type_name.into(),
      message: message.into(),
    }
  }
}

/// Errors that can occur during task execution.
#[derive(Debug, Error)]
pub enum TaskError {
  /// Invalid input value.
  #[error("invalid input '{field}': {message}")]
  InvalidInput { field: String, message: String },

  /// A template could not be rendered.
  #[error("failed to render template '{field}': {message}")]
  Template { field: String, message: String },

  /// HTTP request failed.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// Generic failure reported by a task implementation.
  #[error("{message}")]
  Execution { message: String },

  /// A named step of a chain failed.
  #[error("input [{step}] of type [{type_name}] failed: {source}")]
  Step {
    step: String,
    type_name: String,
    #[source]
    source: Box<TaskError>,
  },
}

impl TaskError {
  pub fn execution(message: impl Into<String>) -> Self {
    Self::Execution {
      message: message.into(),
    }
  }

  pub fn step(step: impl Into<String>, type_name: impl Into<String>, source: TaskError) -> Self {
    Self::Step {
      step: step.into(),
      type_name: type_name.into(),
      source: Box::new(source),
    }
  }

  /// The innermost error, looking through [`TaskError::Step`] wrappers.
  pub fn root_cause(&self) -> &TaskError {
    match self {
      Self::Step { source, .. } => source.root_cause(),
      other => other,
    }
  }

  /// Label of the error kind, used as the prefix of failure reasons.
  pub fn kind(&self) -> &'static str {
    match self.root_cause() {
      Self::InvalidInput { .. } => "InvalidInputError",
      Self::Template { .. } => "TemplateError",
      Self::Http(_) => "HttpError",
      Self::Execution { .. } | Self::Step { .. } => "ExecutionError",
    }
  }

  /// `<kind>[<message>]`, the form stored in failed results.
  pub fn detailed_message(&self) -> String {
    format!("{}[{}]", self.kind(), self)
  }
}

/// Short name of a JSON value's kind, for error messages.
pub fn describe_json(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_detailed_message() {
    let err = TaskError::execution("foo");
    assert_eq!(err.detailed_message(), "ExecutionError[foo]");
  }

  #[test]
  fn test_step_reports_root_kind() {
    let inner = TaskError::Template {
      field: "request.path".to_string(),
      message: "unexpected end of input".to_string(),
    };
    let err = TaskError::step("outer", "chain", TaskError::step("inner", "http", inner));

    assert_eq!(err.kind(), "TemplateError");
    assert!(matches!(err.root_cause(), TaskError::Template { .. }));

    let message = err.detailed_message();
    assert!(message.starts_with("TemplateError[input [outer] of type [chain] failed: "));
    assert!(message.contains("input [inner] of type [http] failed"));
    assert!(message.ends_with("unexpected end of input]"));
  }

  #[test]
  fn test_parse_step_message() {
    let err = ParseError::Step {
      step: "first".to_string(),
      type_name: "nope".to_string(),
      source: Box::new(ParseError::UnknownType {
        type_name: "nope".to_string(),
      }),
    };
    assert_eq!(
      err.to_string(),
      "could not parse input [first] of type [nope]: no task type registered for [nope]"
    );
  }
}
