//! Strand task runners
//!
//! A small set of interchangeable runners that accept units of work, run
//! them to completion, and let callers chain follow-up work that executes
//! on a specific, possibly different runner:
//!
//! - [`Synchronization`]: the lock plus wait/notify monitor cooperating
//!   runners share
//! - [`AsyncRunner`]: the runner capability contract
//!   (schedule, count, wait-idle)
//! - [`CurrentThreadRunner`]: a cooperative FIFO queue with no thread of
//!   its own, drained by whoever calls `wait_idle`
//! - [`ParallelRunner`]: worker-thread backed, executes concurrently with
//!   the scheduling thread
//! - [`TaskHandle`]: the `then()`-chainable handle returned by
//!   [`schedule`](AsyncRunnerExt::schedule); continuations are dispatched
//!   to the runner that was registered current when `then()` was called
//!
//! Registration of the current runner is scoped through
//! [`CurrentThreadRunner::with_registered`] and restored on all exit
//! paths.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod current_thread;
mod handle;
mod parallel;
mod registration;
mod runner;
mod sync;

pub use current_thread::CurrentThreadRunner;
pub use handle::{CompletionState, TaskError, TaskHandle};
pub use parallel::ParallelRunner;
pub use registration::current_runner;
pub use runner::{default_runner, AsyncRunner, AsyncRunnerExt, ScheduledTask};
pub use sync::Synchronization;
