//! Runner backed by real worker threads
//!
//! Workers dequeue and execute tasks as soon as they are queued,
//! independently of any `wait_idle` call. A panicking task is caught
//! per-task so one failure does not terminate the worker loop.

use crate::runner::{AsyncRunner, ScheduledTask};
use crate::sync::Synchronization;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Queue state shared with the worker threads.
///
/// Mutated only while holding the [`Synchronization`] lock.
struct ParallelQueue {
    /// Accepted tasks not yet picked up by a worker, FIFO
    tasks: VecDeque<ScheduledTask>,
    /// Tasks popped from the queue and still executing on a worker
    in_flight: usize,
}

/// An [`AsyncRunner`] that executes tasks on dedicated worker threads,
/// concurrently with the thread that scheduled them.
///
/// [`wait_idle`](AsyncRunner::wait_idle) parks the caller until the queue
/// observed at entry has drained and every in-flight task has finished; it
/// never executes tasks itself.
pub struct ParallelRunner {
    sync: Arc<Synchronization>,
    queue: Arc<Mutex<ParallelQueue>>,
    shutdown: Arc<AtomicBool>,
    worker_count: usize,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl ParallelRunner {
    /// Create a runner with a single worker thread attached to `sync`.
    pub fn new(sync: Arc<Synchronization>) -> Arc<Self> {
        Self::with_workers(sync, 1)
    }

    /// Create a runner with `worker_count` worker threads.
    /// A count of 0 uses the number of CPU cores.
    pub fn with_workers(sync: Arc<Synchronization>, worker_count: usize) -> Arc<Self> {
        let count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        };

        let queue = Arc::new(Mutex::new(ParallelQueue {
            tasks: VecDeque::new(),
            in_flight: 0,
        }));
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(count);
        for id in 0..count {
            let sync = sync.clone();
            let queue = queue.clone();
            let shutdown = shutdown.clone();
            let handle = thread::Builder::new()
                .name(format!("strand-worker-{}", id))
                .spawn(move || Self::run_loop(id, &sync, &queue, &shutdown))
                .expect("Failed to spawn worker thread");
            workers.push(handle);
        }

        Arc::new(Self {
            sync,
            queue,
            shutdown,
            worker_count: count,
            workers: Mutex::new(workers),
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Stop the workers: set the shutdown flag, discard tasks that have
    /// not started, wake everything, and join the threads. Idempotent;
    /// called on drop. Tasks already in flight run to completion.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        {
            let held = self.sync.lock();
            self.queue.lock().tasks.clear();
            self.sync.notify_all_locked(&held);
        }
        for handle in self.workers.lock().drain(..) {
            if handle.join().is_err() {
                eprintln!("strand: worker thread terminated by panic");
            }
        }
    }

    /// Worker thread main loop: pop, execute outside the lock, repeat.
    fn run_loop(
        id: usize,
        sync: &Synchronization,
        queue: &Mutex<ParallelQueue>,
        shutdown: &AtomicBool,
    ) {
        loop {
            let task = {
                let mut held = sync.lock();
                loop {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let popped = {
                        let mut state = queue.lock();
                        let task = state.tasks.pop_front();
                        if task.is_some() {
                            state.in_flight += 1;
                        }
                        task
                    };
                    match popped {
                        Some(task) => break task,
                        None => sync.wait_for_notify(&mut held),
                    }
                }
            };

            // A panicking task must not take the worker down; the handle
            // wrapper has already recorded the failure for callers that
            // scheduled through the typed API.
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                eprintln!("strand-worker-{}: scheduled task panicked", id);
            }

            let held = sync.lock();
            queue.lock().in_flight -= 1;
            sync.notify_all_locked(&held);
        }
    }
}

impl AsyncRunner for ParallelRunner {
    fn schedule_task(&self, task: ScheduledTask) {
        let held = self.sync.lock();
        self.queue.lock().tasks.push_back(task);
        self.sync.notify_all_locked(&held);
    }

    fn scheduled_task_count(&self) -> usize {
        let _held = self.sync.lock();
        self.queue.lock().tasks.len()
    }

    fn wait_idle(&self) {
        let mut held = self.sync.lock();
        loop {
            let drained = {
                let state = self.queue.lock();
                state.tasks.is_empty() && state.in_flight == 0
            };
            if drained {
                return;
            }
            self.sync.wait_for_notify(&mut held);
        }
    }
}

impl Drop for ParallelRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::AsyncRunnerExt;
    use parking_lot::Condvar;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn new_runner() -> Arc<ParallelRunner> {
        ParallelRunner::new(Arc::new(Synchronization::new()))
    }

    /// A reusable open/closed gate tasks can block on.
    struct Gate {
        open: Mutex<bool>,
        condvar: Condvar,
    }

    impl Gate {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                open: Mutex::new(false),
                condvar: Condvar::new(),
            })
        }

        fn wait(&self) {
            let mut open = self.open.lock();
            while !*open {
                self.condvar.wait(&mut open);
            }
        }

        fn open(&self) {
            *self.open.lock() = true;
            self.condvar.notify_all();
        }
    }

    #[test]
    fn test_executes_without_wait_idle() {
        let runner = new_runner();
        let handle = runner.schedule(|| 7);

        // The worker picks the task up on its own; no drain call needed.
        assert_eq!(handle.wait(), Ok(7));
    }

    #[test]
    fn test_wait_idle_blocks_until_task_finished() {
        let runner = new_runner();
        let executed = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let executed = executed.clone();
            runner.schedule_task(Box::new(move || {
                thread::sleep(Duration::from_millis(10));
                executed.fetch_add(1, Ordering::SeqCst);
            }));
        }

        runner.wait_idle();
        assert_eq!(executed.load(Ordering::SeqCst), 5);
        assert_eq!(runner.scheduled_task_count(), 0);
    }

    #[test]
    fn test_count_reflects_unstarted_tasks() {
        let runner = new_runner();
        let gate = Gate::new();

        {
            let gate = gate.clone();
            runner.schedule_task(Box::new(move || gate.wait()));
        }

        // Wait for the single worker to pick the blocker up.
        while runner.scheduled_task_count() > 0 {
            thread::sleep(Duration::from_millis(1));
        }

        runner.schedule_task(Box::new(|| {}));
        runner.schedule_task(Box::new(|| {}));
        assert_eq!(runner.scheduled_task_count(), 2);

        gate.open();
        runner.wait_idle();
        assert_eq!(runner.scheduled_task_count(), 0);
    }

    #[test]
    fn test_panicking_task_keeps_worker_alive() {
        let runner = new_runner();

        let failed = runner.schedule(|| -> i32 { panic!("task exploded") });
        let survived = runner.schedule(|| 1);

        runner.wait_idle();
        assert!(failed.error().is_some());
        assert_eq!(survived.value(), Some(1));
    }

    #[test]
    fn test_wait_idle_returns_normally_after_failure() {
        let runner = new_runner();
        runner.schedule_task(Box::new(|| panic!("raw task exploded")));
        runner.wait_idle();
        assert_eq!(runner.scheduled_task_count(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let runner = new_runner();
        runner.schedule(|| 1).wait().expect("task failed");

        runner.shutdown();
        runner.shutdown();
    }

    #[test]
    fn test_with_workers_zero_uses_cpu_count() {
        let runner = ParallelRunner::with_workers(Arc::new(Synchronization::new()), 0);
        assert_eq!(runner.worker_count(), num_cpus::get());
    }

    #[test]
    fn test_multiple_workers_drain_queue() {
        let runner = ParallelRunner::with_workers(Arc::new(Synchronization::new()), 4);
        let executed = Arc::new(AtomicUsize::new(0));

        for _ in 0..32 {
            let executed = executed.clone();
            runner.schedule_task(Box::new(move || {
                executed.fetch_add(1, Ordering::SeqCst);
            }));
        }

        runner.wait_idle();
        assert_eq!(executed.load(Ordering::SeqCst), 32);
    }
}
