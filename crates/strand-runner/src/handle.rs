//! Future-like handle for scheduled work
//!
//! [`TaskHandle`] is what [`schedule`](crate::AsyncRunnerExt::schedule)
//! returns. It is a one-shot completion state machine with an ordered list
//! of continuations; each continuation is paired with the runner that was
//! registered current when `then()` was called, and is dispatched to that
//! runner once the parent settles. That is how a result produced on a
//! background runner is marshaled back to the caller's own runner without
//! the caller posting it back by hand.

use crate::registration;
use crate::runner::AsyncRunner;
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Why a scheduled task failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The task (or a continuation) panicked while executing
    #[error("task panicked: {message}")]
    Panicked {
        /// Stringified panic payload
        message: String,
    },
}

impl TaskError {
    fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked { message }
    }
}

/// Completion state of a [`TaskHandle`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompletionState {
    /// Work accepted, outcome not yet known
    Pending,
    /// Finished with a value
    Completed,
    /// Finished with a captured error
    Failed,
}

/// A registered continuation paired with the runner that was ambient when
/// `then()` was called.
struct Continuation<T> {
    run: Box<dyn FnOnce(Result<T, TaskError>) + Send>,
    captured: Option<Arc<dyn AsyncRunner>>,
}

enum HandleState<T> {
    /// Continuations registered so far, in `then()` call order
    Pending { continuations: Vec<Continuation<T>> },
    Completed(T),
    Failed(TaskError),
}

struct HandleInner<T> {
    state: Mutex<HandleState<T>>,
    settled: Condvar,
}

/// Handle to a unit of work accepted by an
/// [`AsyncRunner`](crate::AsyncRunner).
///
/// States: pending, then exactly once completed (with a value) or failed
/// (with a [`TaskError`]). Cloning is cheap and clones observe the same
/// underlying completion.
///
/// The value type must be `Clone` because every registered continuation
/// receives its own copy.
pub struct TaskHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> TaskHandle<T> {
    /// Create a handle in the pending state. Only runners mint handles;
    /// scheduled work is the only thing that settles them.
    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                state: Mutex::new(HandleState::Pending {
                    continuations: Vec::new(),
                }),
                settled: Condvar::new(),
            }),
        }
    }

    /// Current completion state.
    pub fn state(&self) -> CompletionState {
        match *self.inner.state.lock() {
            HandleState::Pending { .. } => CompletionState::Pending,
            HandleState::Completed(_) => CompletionState::Completed,
            HandleState::Failed(_) => CompletionState::Failed,
        }
    }

    /// The captured error, if the handle failed.
    pub fn error(&self) -> Option<TaskError> {
        match &*self.inner.state.lock() {
            HandleState::Failed(error) => Some(error.clone()),
            _ => None,
        }
    }
}

impl<T: Send + Clone + 'static> TaskHandle<T> {
    /// The produced value, if the handle completed.
    pub fn value(&self) -> Option<T> {
        match &*self.inner.state.lock() {
            HandleState::Completed(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Block the calling thread until the handle settles.
    ///
    /// This parks the OS thread; it does not drain any runner. Use a
    /// runner's `wait_idle` to make cooperative queues progress.
    pub fn wait(&self) -> Result<T, TaskError> {
        let mut state = self.inner.state.lock();
        loop {
            match &*state {
                HandleState::Completed(value) => return Ok(value.clone()),
                HandleState::Failed(error) => return Err(error.clone()),
                HandleState::Pending { .. } => self.inner.settled.wait(&mut state),
            }
        }
    }

    /// Chain a continuation that receives the completed value.
    ///
    /// The runner registered current at this call is captured; once the
    /// parent completes, the continuation is scheduled onto it as a fresh
    /// task. Calling `then` on an already settled handle dispatches
    /// immediately instead of queuing. If no runner is registered, the
    /// continuation runs inline on whichever thread settles the parent.
    ///
    /// A failed parent skips the continuation and fails the derived handle
    /// with the same error.
    pub fn then<U, F>(&self, f: F) -> TaskHandle<U>
    where
        U: Send + Clone + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let derived = TaskHandle::pending();
        let completer = derived.clone();
        self.register(Continuation {
            captured: registration::current_runner(),
            run: Box::new(move |outcome| match outcome {
                Ok(value) => completer.run_to_completion(move || f(value)),
                Err(error) => completer.fail(error),
            }),
        });
        derived
    }

    /// Chain an error handler.
    ///
    /// Capture semantics match [`then`](TaskHandle::then). A failed parent
    /// invokes `f` with the error and completes the derived handle with
    /// its return value; a completed parent passes its value through
    /// untouched.
    pub fn on_error<F>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce(TaskError) -> T + Send + 'static,
    {
        let derived = TaskHandle::pending();
        let completer = derived.clone();
        self.register(Continuation {
            captured: registration::current_runner(),
            run: Box::new(move |outcome| match outcome {
                Ok(value) => completer.complete(value),
                Err(error) => completer.run_to_completion(move || f(error)),
            }),
        });
        derived
    }

    /// Execute `work` and settle the handle with its outcome, turning a
    /// panic into a failure instead of unwinding into the runner loop.
    pub(crate) fn run_to_completion(&self, work: impl FnOnce() -> T) {
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => self.complete(value),
            Err(payload) => self.fail(TaskError::from_panic(payload)),
        }
    }

    pub(crate) fn complete(&self, value: T) {
        self.settle(Ok(value));
    }

    pub(crate) fn fail(&self, error: TaskError) {
        self.settle(Err(error));
    }

    /// Transition out of pending and fire the registered continuations in
    /// registration order. A second settle attempt is ignored.
    fn settle(&self, outcome: Result<T, TaskError>) {
        let fired = {
            let mut state = self.inner.state.lock();
            let continuations = match &mut *state {
                HandleState::Pending { continuations } => std::mem::take(continuations),
                _ => return,
            };
            *state = match &outcome {
                Ok(value) => HandleState::Completed(value.clone()),
                Err(error) => HandleState::Failed(error.clone()),
            };
            self.inner.settled.notify_all();
            continuations
        };

        for continuation in fired {
            dispatch(continuation, outcome.clone());
        }
    }

    /// Queue the continuation if still pending, otherwise dispatch it
    /// immediately with the settled outcome.
    fn register(&self, continuation: Continuation<T>) {
        let mut state = self.inner.state.lock();
        let outcome = match &mut *state {
            HandleState::Pending { continuations } => {
                continuations.push(continuation);
                return;
            }
            HandleState::Completed(value) => Ok(value.clone()),
            HandleState::Failed(error) => Err(error.clone()),
        };
        drop(state);
        dispatch(continuation, outcome);
    }
}

/// Hand a fired continuation to its captured runner, or run it inline when
/// nothing was registered at `then()` time.
fn dispatch<T: Send + 'static>(continuation: Continuation<T>, outcome: Result<T, TaskError>) {
    let Continuation { run, captured } = continuation;
    match captured {
        Some(runner) => runner.schedule_task(Box::new(move || run(outcome))),
        None => run(outcome),
    }
}
