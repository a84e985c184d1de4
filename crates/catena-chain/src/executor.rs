//! Chain executor implementation.

use catena_task::{ExecutionContext, Payload, TaskError};
use tracing::{debug, error, info, instrument};

use crate::result::ChainResult;
use crate::spec::{ChainSpec, ChainStep};

/// Runs the steps of a [`ChainSpec`] in order.
///
/// Step `i` receives the chain's input payload overlaid with the results of
/// steps `0..i`, each under its step name. The first failing step stops the
/// run; the steps after it are never executed.
pub struct ChainExecutor<'a> {
  spec: &'a ChainSpec,
}

impl<'a> ChainExecutor<'a> {
  pub fn new(spec: &'a ChainSpec) -> Self {
    Self { spec }
  }

  /// Execute the chain. Step failures are captured in the result.
  #[instrument(
    name = "chain_execute",
    skip(self, ctx, payload),
    fields(
      watch_id = %ctx.watch_id,
      execution_id = %ctx.execution_id,
      steps = self.spec.len(),
    )
  )]
  pub fn execute(&self, ctx: &ExecutionContext, payload: &Payload) -> ChainResult {
    info!("chain started");

    match self.run(ctx, payload) {
      Ok(aggregate) => {
        info!(results = aggregate.len(), "chain completed");
        ChainResult::success(aggregate)
      }
      Err(e) => {
        error!(error = %e, "chain failed");
        ChainResult::failure(&e)
      }
    }
  }

  /// Execute the chain, returning the aggregate or the first step error
  /// (wrapped with that step's name and type).
  pub fn run(&self, ctx: &ExecutionContext, payload: &Payload) -> Result<Payload, TaskError> {
    self
      .spec
      .steps()
      .iter()
      .try_fold(Payload::new(), |mut aggregate, step| -> Result<Payload, TaskError> {
        let input = payload.merged(&aggregate);
        let output = execute_step(step, ctx, &input)?;
        aggregate.insert(step.name(), output.into_value());
        Ok(aggregate)
      })
  }
}

#[instrument(
  name = "chain_step",
  skip_all,
  fields(step = %step.name(), type_name = %step.type_name())
)]
fn execute_step(
  step: &ChainStep,
  ctx: &ExecutionContext,
  input: &Payload,
) -> Result<Payload, TaskError> {
  debug!(input_keys = input.len(), "step started");

  match step.task().execute(ctx, input) {
    Ok(output) => {
      debug!(output_keys = output.len(), "step completed");
      Ok(output)
    }
    Err(e) => {
      error!(error = %e, "step failed");
      Err(TaskError::step(step.name(), step.type_name(), e))
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use catena_task::{SimpleTask, Task};
  use serde_json::{Value, json};

  use super::*;

  /// Counts executions and echoes its input payload back.
  #[derive(Debug, Default)]
  struct EchoTask {
    calls: Arc<AtomicUsize>,
  }

  impl Task for EchoTask {
    fn type_name(&self) -> &str {
      "echo"
    }

    fn to_value(&self) -> Value {
      json!({})
    }

    fn execute(&self, _ctx: &ExecutionContext, input: &Payload) -> Result<Payload, TaskError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(input.clone())
    }
  }

  #[derive(Debug)]
  struct FailingTask;

  impl Task for FailingTask {
    fn type_name(&self) -> &str {
      "failing"
    }

    fn to_value(&self) -> Value {
      json!({})
    }

    fn execute(&self, _ctx: &ExecutionContext, _input: &Payload) -> Result<Payload, TaskError> {
      Err(TaskError::execution("boom"))
    }
  }

  fn ctx() -> ExecutionContext {
    ExecutionContext::new("test-watch")
  }

  #[test]
  fn test_empty_chain_succeeds_with_empty_payload() {
    let spec = ChainSpec::default();
    let initial = Payload::try_from(json!({"ignored": true})).unwrap();

    let result = ChainExecutor::new(&spec).execute(&ctx(), &initial);
    assert_eq!(result, ChainResult::success(Payload::new()));
  }

  #[test]
  fn test_later_steps_see_earlier_results() {
    let echo_calls = Arc::new(AtomicUsize::new(0));
    let spec = ChainSpec::builder()
      .add("first", SimpleTask::single("foo", "bar"))
      .add(
        "second",
        EchoTask {
          calls: echo_calls.clone(),
        },
      )
      .build();

    let payload = ChainExecutor::new(&spec)
      .run(&ctx(), &Payload::new())
      .unwrap();

    assert_eq!(echo_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
      payload.into_value(),
      json!({
        "first": {"foo": "bar"},
        "second": {"first": {"foo": "bar"}}
      })
    );
  }

  #[test]
  fn test_initial_payload_visible_but_not_in_aggregate() {
    let spec = ChainSpec::builder().add("echo", EchoTask::default()).build();
    let initial = Payload::try_from(json!({"trigger": {"id": 7}})).unwrap();

    let payload = ChainExecutor::new(&spec).run(&ctx(), &initial).unwrap();
    assert_eq!(payload.into_value(), json!({"echo": {"trigger": {"id": 7}}}));
  }

  #[test]
  fn test_step_result_shadows_initial_payload() {
    let spec = ChainSpec::builder()
      .add("trigger", SimpleTask::single("id", 8))
      .add("echo", EchoTask::default())
      .build();
    let initial = Payload::try_from(json!({"trigger": {"id": 7}})).unwrap();

    let payload = ChainExecutor::new(&spec).run(&ctx(), &initial).unwrap();
    assert_eq!(payload.get("echo"), Some(&json!({"trigger": {"id": 8}})));
  }

  #[test]
  fn test_fail_fast() {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let spec = ChainSpec::builder()
      .add(
        "before",
        EchoTask {
          calls: before.clone(),
        },
      )
      .add("broken", FailingTask)
      .add(
        "after",
        EchoTask {
          calls: after.clone(),
        },
      )
      .build();

    let result = ChainExecutor::new(&spec).execute(&ctx(), &Payload::new());

    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 0);
    assert!(!result.is_success());
    assert!(result.payload().is_none());
    assert_eq!(
      result.reason(),
      Some("ExecutionError[input [broken] of type [failing] failed: boom]")
    );
  }

  #[test]
  fn test_run_wraps_step_error() {
    let spec = ChainSpec::builder().add("broken", FailingTask).build();

    let err = ChainExecutor::new(&spec)
      .run(&ctx(), &Payload::new())
      .unwrap_err();
    match err {
      TaskError::Step {
        step, type_name, ..
      } => {
        assert_eq!(step, "broken");
        assert_eq!(type_name, "failing");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_duplicate_names_last_write_wins() {
    let spec = ChainSpec::builder()
      .add("same", SimpleTask::single("n", 1))
      .add("other", SimpleTask::single("m", 0))
      .add("same", SimpleTask::single("n", 2))
      .build();

    let payload = ChainExecutor::new(&spec)
      .run(&ctx(), &Payload::new())
      .unwrap();

    assert_eq!(payload.len(), 2);
    assert_eq!(payload.get("same"), Some(&json!({"n": 2})));
    // the overwritten entry keeps its original position
    assert_eq!(payload.keys().collect::<Vec<_>>(), ["same", "other"]);
  }

  #[test]
  fn test_spec_reusable_across_threads() {
    let spec = Arc::new(
      ChainSpec::builder()
        .add("first", SimpleTask::single("foo", "bar"))
        .build(),
    );

    let handles: Vec<_> = (0..4)
      .map(|i| {
        let spec = spec.clone();
        std::thread::spawn(move || {
          let ctx = ExecutionContext::new(format!("watch-{i}"));
          ChainExecutor::new(&spec).execute(&ctx, &Payload::new())
        })
      })
      .collect();

    for handle in handles {
      let result = handle.join().unwrap();
      assert_eq!(
        result.payload().and_then(|p| p.get("first")),
        Some(&json!({"foo": "bar"}))
      );
    }
  }
}
