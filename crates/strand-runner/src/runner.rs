//! The runner capability contract

use crate::handle::TaskHandle;
use crate::parallel::ParallelRunner;
use crate::sync::Synchronization;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// A unit of work accepted by a runner.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Anything that can accept scheduled work and report or await its own
/// pending queue.
///
/// Two implementations ship with this crate:
/// [`CurrentThreadRunner`](crate::CurrentThreadRunner), a cooperative queue
/// that only drains inside `wait_idle`, and
/// [`ParallelRunner`](crate::ParallelRunner), which executes on dedicated
/// worker threads. Collaborators hold an injected `Arc<dyn AsyncRunner>`
/// and must not assume which concrete runner they were given.
pub trait AsyncRunner: Send + Sync {
    /// Accept a task. Tasks start in FIFO submission order.
    fn schedule_task(&self, task: ScheduledTask);

    /// Number of tasks accepted but not yet started, at the instant of the
    /// call.
    ///
    /// A point-in-time snapshot: for a runner with worker threads the value
    /// may be stale as soon as it is read. An inspection aid, not a
    /// synchronization primitive.
    fn scheduled_task_count(&self) -> usize;

    /// Block the calling thread until this runner's queue has drained.
    ///
    /// Cooperative runners execute the queued tasks on the calling thread;
    /// worker-backed runners park until their workers finish. No timeout
    /// variant exists; callers needing bounded waits must arrange them
    /// externally.
    fn wait_idle(&self);
}

/// Typed scheduling over [`AsyncRunner::schedule_task`].
pub trait AsyncRunnerExt: AsyncRunner {
    /// Schedule `work` and return a [`TaskHandle`] that settles with its
    /// outcome.
    ///
    /// A panicking task fails the handle; the runner's execution loop
    /// survives and `wait_idle` still returns normally, so a caller that
    /// never inspects the handle will not see the failure.
    fn schedule<T, F>(&self, work: F) -> TaskHandle<T>
    where
        T: Send + Clone + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = TaskHandle::pending();
        let completer = handle.clone();
        self.schedule_task(Box::new(move || completer.run_to_completion(work)));
        handle
    }
}

impl<R: AsyncRunner + ?Sized> AsyncRunnerExt for R {}

static DEFAULT_RUNNER: Lazy<Arc<ParallelRunner>> =
    Lazy::new(|| ParallelRunner::new(Arc::new(Synchronization::new())));

/// The process-wide runner collaborators fall back to when no runner is
/// injected. Its workers live for the rest of the process.
pub fn default_runner() -> Arc<dyn AsyncRunner> {
    DEFAULT_RUNNER.clone()
}
