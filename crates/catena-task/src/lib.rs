//! Catena Task
//!
//! The pluggable unit of work inside a chain. A task type is a pair of a
//! [`TaskFactory`], which parses the type-specific body of a chain entry, and
//! the [`Task`] it produces, which executes against an [`ExecutionContext`] and
//! an input [`Payload`].
//!
//! Factories are looked up by type name in a [`TaskRegistry`] that is
//! populated once at startup and read-only afterwards.
//!
//! Built-in task types:
//! - `simple`: returns its configured object verbatim
//! - `http`: performs a templated HTTP request and returns the response

mod context;
mod error;
mod http;
mod payload;
mod registry;
mod simple;
mod task;
mod template;

pub use context::ExecutionContext;
pub use error::{ParseError, TaskError, describe_json};
pub use http::{
  HttpAuth, HttpMethod, HttpRequestTemplate, HttpTask, HttpTaskDef, HttpTaskFactory,
  ResponseContentType, Scheme,
};
pub use payload::Payload;
pub use registry::TaskRegistry;
pub use simple::{SimpleTask, SimpleTaskFactory};
pub use task::{Task, TaskFactory};
pub use template::TemplateContext;
