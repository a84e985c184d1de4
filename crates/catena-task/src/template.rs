//! Template rendering using minijinja.
//!
//! Task fields that accept templates are rendered against the execution
//! context and the step's input payload, which is how a step consumes the
//! results of earlier steps in the same chain:
//!
//! ```json
//! { "path": "/{{ ctx.payload.first.index }}/_search",
//!   "params": { "q": "owner:{{ ctx.watch_id }}" } }
//! ```
//!
//! Undefined variables render as empty strings.

use minijinja::{Environment, Value};

use crate::context::ExecutionContext;
use crate::error::TaskError;
use crate::payload::Payload;

/// Environment plus model for rendering the templates of one task execution.
pub struct TemplateContext {
  env: Environment<'static>,
  model: Value,
}

impl TemplateContext {
  pub fn new(ctx: &ExecutionContext, payload: &Payload) -> Self {
    Self {
      env: Environment::new(),
      model: Value::from_serialize(ctx.template_model(payload)),
    }
  }

  /// Render one template. `field` names the template in error messages.
  pub fn render(&self, field: &str, template: &str) -> Result<String, TaskError> {
    self
      .env
      .render_str(template, self.model.clone())
      .map_err(|e| TaskError::Template {
        field: field.to_string(),
        message: e.to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn context() -> TemplateContext {
    let ctx = ExecutionContext::new("watch-1");
    let payload = Payload::try_from(json!({
      "first": { "index": "logs", "count": 5, "name": "john doe" }
    }))
    .unwrap();
    TemplateContext::new(&ctx, &payload)
  }

  #[test]
  fn test_render_payload_values() {
    let templates = context();

    assert_eq!(
      templates
        .render("path", "/{{ ctx.payload.first.index }}/_search")
        .unwrap(),
      "/logs/_search"
    );
    assert_eq!(
      templates.render("count", "{{ ctx.payload.first.count }}").unwrap(),
      "5"
    );
  }

  #[test]
  fn test_render_context_fields() {
    let templates = context();
    assert_eq!(
      templates.render("q", "owner:{{ ctx.watch_id }}").unwrap(),
      "owner:watch-1"
    );
  }

  #[test]
  fn test_render_literal() {
    let templates = context();
    assert_eq!(templates.render("body", "hello world").unwrap(), "hello world");
  }

  #[test]
  fn test_minijinja_filters() {
    let templates = context();
    assert_eq!(
      templates
        .render("greeting", "Hello {{ ctx.payload.first.name | title }}!")
        .unwrap(),
      "Hello John Doe!"
    );
  }

  #[test]
  fn test_undefined_renders_empty() {
    let templates = context();
    assert_eq!(
      templates.render("path", "/{{ ctx.payload.missing }}").unwrap(),
      "/"
    );
  }

  #[test]
  fn test_syntax_error() {
    let templates = context();
    let err = templates.render("path", "{{ ctx.payload").unwrap_err();
    assert!(matches!(err, TaskError::Template { ref field, .. } if field == "path"));
  }
}
