//! Thought notification port
//!
//! Callers observe a run through [`ThoughtNotifier`]: every intermediate
//! note, action and observation is delivered in emission order. The task
//! hooks let a presentation layer drive progress indicators.

use reasoning_domain::{Task, TaskResult, ThoughtEvent};

/// Callback for streamed thoughts during an orchestration run
pub trait ThoughtNotifier: Send + Sync {
    fn on_thought(&self, event: &ThoughtEvent);

    /// Called when a task enters its reasoning loop (`position` is 1-based)
    fn on_task_start(&self, _task: &Task, _position: usize, _total: usize) {}

    fn on_task_complete(&self, _task: &Task, _result: &TaskResult) {}
}

/// No-op notifier
pub struct NoThoughts;

impl ThoughtNotifier for NoThoughts {
    fn on_thought(&self, _event: &ThoughtEvent) {}
}

impl<F> ThoughtNotifier for F
where
    F: Fn(&ThoughtEvent) + Send + Sync,
{
    fn on_thought(&self, event: &ThoughtEvent) {
        self(event)
    }
}
