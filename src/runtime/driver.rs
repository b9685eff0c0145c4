//! Driver thread that pumps a job queue.
//!
//! The thread enters the queue's context before running anything, so jobs
//! that create promises schedule back onto the same queue. A panicking job is
//! logged and does not take the driver down with it.

use crate::builder::RuntimeBuilder;
use crate::runtime::{Handle, JobQueue, Runtime, enter_context};

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

// Runtime used when no scheduler context is entered.
static DEFAULT_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Starts a driver thread for `queue`.
pub(crate) fn spawn(
    queue: Arc<JobQueue>,
    name: String,
    stack_size: Option<usize>,
) -> io::Result<JoinHandle<()>> {
    let mut builder = thread::Builder::new().name(name);
    if let Some(size) = stack_size {
        builder = builder.stack_size(size);
    }

    builder.spawn(move || {
        debug!("promise driver started");

        enter_context(Handle::from_arc(queue.clone()), || {
            while let Some(job) = queue.wait_pop() {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    warn!(panic = panic_message(&*payload), "deferred job panicked");
                }
            }
        });

        debug!("promise driver stopped");
    })
}

/// Handle to the process-wide default runtime, starting it on first use.
pub(crate) fn default_handle() -> Handle {
    DEFAULT_RUNTIME
        .get_or_init(|| {
            RuntimeBuilder::new()
                .thread_name("promise-default-driver")
                .build()
                .expect("failed to spawn the default promise driver thread")
        })
        .handle()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_payload_text() {
        let payload = panic::catch_unwind::<_, ()>(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");

        let payload = panic::catch_unwind::<_, ()>(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_message(&*payload), "code 7");

        let payload = panic::catch_unwind::<_, ()>(|| std::panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "<non-string panic payload>");
    }
}
