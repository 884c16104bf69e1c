//! Cooperative runner with no dedicated thread

use crate::registration::RegistrationGuard;
use crate::runner::{AsyncRunner, ScheduledTask};
use crate::sync::Synchronization;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// An [`AsyncRunner`] whose queue drains only when some thread calls
/// [`wait_idle`](AsyncRunner::wait_idle).
///
/// No thread is ever spawned. Usable both as a main/foreground event loop
/// and as a stand-in background runner in single-process tests; two
/// instances sharing one [`Synchronization`] can hand work to each other.
pub struct CurrentThreadRunner {
    sync: Arc<Synchronization>,
    /// Pending tasks, FIFO. Mutated only while holding the shared
    /// synchronization lock; lock order is always sync before queue.
    queue: Mutex<VecDeque<ScheduledTask>>,
}

impl CurrentThreadRunner {
    /// Create a runner attached to `sync`.
    pub fn new(sync: Arc<Synchronization>) -> Arc<Self> {
        Arc::new(Self {
            sync,
            queue: Mutex::new(VecDeque::new()),
        })
    }

    /// The synchronization object this runner coordinates through.
    pub fn synchronization(&self) -> &Arc<Synchronization> {
        &self.sync
    }

    /// Run `body` with a fresh runner (sharing `sync`) registered as the
    /// ambient current runner.
    ///
    /// Within the dynamic extent of `body`, `then()` captures this runner;
    /// that includes calls made from inside tasks the runner executes
    /// during `wait_idle`, which is what makes same-runner re-entrant
    /// chains work. The previous registration is restored on normal return
    /// and on panic.
    pub fn with_registered<R>(
        sync: &Arc<Synchronization>,
        body: impl FnOnce(&Arc<CurrentThreadRunner>) -> R,
    ) -> R {
        let runner = CurrentThreadRunner::new(sync.clone());
        let _registered = RegistrationGuard::enter(runner.clone());
        body(&runner)
    }
}

impl AsyncRunner for CurrentThreadRunner {
    fn schedule_task(&self, task: ScheduledTask) {
        let held = self.sync.lock();
        self.queue.lock().push_back(task);
        self.sync.notify_all_locked(&held);
    }

    fn scheduled_task_count(&self) -> usize {
        let _held = self.sync.lock();
        self.queue.lock().len()
    }

    fn wait_idle(&self) {
        loop {
            let task = {
                let _held = self.sync.lock();
                self.queue.lock().pop_front()
            };
            match task {
                // Run outside the lock so the task can schedule more work
                // onto this or a peer runner without deadlocking.
                Some(task) => task(),
                None => return,
            }
        }
    }
}
