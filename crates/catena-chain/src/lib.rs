//! Catena Chain
//!
//! A chain is an ordered list of named tasks executed one after another.
//! Each step's output is stored under its name in an aggregate payload, and
//! every later step sees the aggregate (merged over the payload the chain was
//! started with) as its input. That is what lets one step's result
//! parameterize the next step's request.
//!
//! Wire format:
//!
//! ```json
//! { "inputs": [
//!     { "first":  { "simple": { "foo": "bar" } } },
//!     { "second": { "http": { "request": { "host": "localhost", "port": 9200 } } } }
//! ] }
//! ```
//!
//! A chain is itself a task type (`chain`), so chains nest.

mod builtin;
mod codec;
mod executor;
mod result;
mod spec;
mod task;

pub use builtin::builtin_registry;
pub use executor::ChainExecutor;
pub use result::ChainResult;
pub use spec::{ChainBuilder, ChainSpec, ChainStep};
pub use task::{ChainTask, ChainTaskFactory};
