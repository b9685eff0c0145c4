//! Thread-local scheduler context.
//!
//! Constructors such as [`Promise::new`](crate::Promise::new) take their
//! scheduler from here, so callers do not have to thread a handle through
//! every call. Schedulers install themselves while they run jobs, which makes
//! promises created inside a reaction land on the same scheduler as the
//! reaction itself.
//!
//! Outside any context the process-wide default [`Runtime`](crate::Runtime)
//! is used; it is started on first use.

use crate::runtime::{Handle, driver};

use std::cell::RefCell;

thread_local! {
    /// Scheduler installed by [`enter_context`] on this thread.
    static CURRENT: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Runs `function` with `handle` as the current scheduler.
///
/// The previous scheduler, if any, is restored on exit, so contexts nest.
/// It is restored even if `function` panics.
pub(crate) fn enter_context<F, R>(handle: Handle, function: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = CURRENT.with(|current| current.borrow_mut().replace(handle));
    let _guard = ContextGuard { previous };

    function()
}

// Puts the previous scheduler back when dropped.
struct ContextGuard {
    previous: Option<Handle>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let _ = CURRENT.try_with(|current| *current.borrow_mut() = previous);
    }
}

/// Returns the current scheduler, falling back to the default runtime.
pub(crate) fn current() -> Handle {
    CURRENT
        .with(|current| current.borrow().clone())
        .unwrap_or_else(driver::default_handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualScheduler;

    fn installed() -> Option<Handle> {
        CURRENT.with(|current| current.borrow().clone())
    }

    #[test]
    fn nested_contexts_restore_previous() {
        let outer = ManualScheduler::new();
        let inner = ManualScheduler::new();

        assert!(installed().is_none());

        outer.enter(|| {
            inner.enter(|| {
                current().schedule(|| {});
            });
            assert_eq!(inner.pending(), 1);

            current().schedule(|| {});
            assert_eq!(outer.pending(), 1);
        });

        assert!(installed().is_none(), "context must be cleared on exit");
    }

    #[test]
    fn panicking_job_restores_previous_context() {
        let outer = ManualScheduler::new();
        let stepped = ManualScheduler::new();
        stepped.handle().schedule(|| panic!("job failed"));

        outer.enter(|| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| stepped.tick()));
            assert!(result.is_err());

            current().schedule(|| {});
            assert_eq!(outer.pending(), 1, "outer context must be back in place");
            assert_eq!(stepped.pending(), 0);
        });

        assert!(installed().is_none());
    }
}
