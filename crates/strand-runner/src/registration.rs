//! Ambient current-runner registration
//!
//! A thread-scoped stack of registered runners. The top of the stack is
//! what `then()` captures at registration time; pushing and popping is
//! done exclusively through the RAII guard so the previous registration
//! is restored on every exit path, panics included.

use crate::runner::AsyncRunner;
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static REGISTERED: RefCell<Vec<Arc<dyn AsyncRunner>>> = RefCell::new(Vec::new());
}

/// The runner registered as current on the calling thread, if any.
pub fn current_runner() -> Option<Arc<dyn AsyncRunner>> {
    REGISTERED.with(|stack| stack.borrow().last().cloned())
}

/// Scope guard keeping a runner at the top of the registration stack.
///
/// The runner is pushed on construction and popped in `Drop`.
pub(crate) struct RegistrationGuard;

impl RegistrationGuard {
    pub(crate) fn enter(runner: Arc<dyn AsyncRunner>) -> Self {
        REGISTERED.with(|stack| stack.borrow_mut().push(runner));
        RegistrationGuard
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        REGISTERED.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::current_thread::CurrentThreadRunner;
    use crate::sync::Synchronization;
    use std::panic::{self, AssertUnwindSafe};

    fn test_runner() -> Arc<dyn AsyncRunner> {
        CurrentThreadRunner::new(Arc::new(Synchronization::new()))
    }

    #[test]
    fn test_no_registration_by_default() {
        assert!(current_runner().is_none());
    }

    #[test]
    fn test_guard_restores_previous_registration() {
        let outer = test_runner();
        let inner = test_runner();

        let _outer_guard = RegistrationGuard::enter(outer.clone());
        {
            let _inner_guard = RegistrationGuard::enter(inner.clone());
            let current = current_runner().expect("inner runner registered");
            assert!(Arc::ptr_eq(&current, &inner));
        }

        let current = current_runner().expect("outer runner restored");
        assert!(Arc::ptr_eq(&current, &outer));
    }

    #[test]
    fn test_registration_restored_on_panic() {
        let runner = test_runner();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = RegistrationGuard::enter(runner.clone());
            panic!("body failed");
        }));

        assert!(result.is_err());
        assert!(current_runner().is_none());
    }
}
