use catena_config::CatenaConfig;
use catena_task::{HttpTask, HttpTaskFactory, SimpleTask, SimpleTaskFactory, TaskRegistry};

use crate::task::{ChainTask, ChainTaskFactory};

/// A registry with every built-in task type: `simple`, `http` and `chain`.
pub fn builtin_registry(config: &CatenaConfig) -> TaskRegistry {
  TaskRegistry::new()
    .with(SimpleTask::TYPE, SimpleTaskFactory)
    .with(HttpTask::TYPE, HttpTaskFactory::new(config.http.clone()))
    .with(ChainTask::TYPE, ChainTaskFactory)
}
