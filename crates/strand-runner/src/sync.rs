//! Shared monitor coordinating two or more runners

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Mutual exclusion plus wait/notify, shared by cooperating runners.
///
/// Runners that hand work to each other share one instance: every mutation
/// of an attached runner's task queue or counters happens while holding
/// [`lock`](Synchronization::lock), and a thread that needs to wait for
/// another runner's progress parks in
/// [`wait_for_notify`](Synchronization::wait_for_notify).
pub struct Synchronization {
    guard: Mutex<()>,
    condvar: Condvar,
}

impl Synchronization {
    /// Create a new monitor.
    pub fn new() -> Self {
        Self {
            guard: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    /// Enter the critical section shared by every runner attached to this
    /// instance.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock()
    }

    /// Release the section and park until another thread notifies.
    ///
    /// The guard is reacquired before returning. Spurious wakeups are
    /// possible; callers re-check their condition in a loop.
    pub fn wait_for_notify(&self, held: &mut MutexGuard<'_, ()>) {
        self.condvar.wait(held);
    }

    /// Wake every thread parked in
    /// [`wait_for_notify`](Synchronization::wait_for_notify).
    ///
    /// Takes the lock before notifying; a waiter that checked its condition
    /// under the guard cannot miss the wake.
    pub fn notify_all(&self) {
        let _held = self.guard.lock();
        self.condvar.notify_all();
    }

    /// Wake waiters while the caller already holds the section.
    pub fn notify_all_locked(&self, _held: &MutexGuard<'_, ()>) {
        self.condvar.notify_all();
    }
}

impl Default for Synchronization {
    fn default() -> Self {
        Self::new()
    }
}
