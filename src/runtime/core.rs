//! Thread-backed scheduler.
//!
//! A [`Runtime`] owns a job queue and a driver thread that runs queued jobs
//! one at a time, in order. It is the production counterpart of
//! [`ManualScheduler`](crate::ManualScheduler).

use crate::builder::RuntimeBuilder;
use crate::runtime::{Handle, JobQueue, driver, enter_context};

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Scheduler backed by a dedicated driver thread.
///
/// Dropping the runtime (or calling [`Runtime::shutdown`]) lets the driver
/// finish the jobs already queued and then joins it.
///
/// # Example
/// ```ignore
/// let rt = Runtime::new()?;
/// let promise = rt.enter(|| Promise::resolve(42));
/// let value = futures::executor::block_on(promise.settled());
/// ```
pub struct Runtime {
    queue: Arc<JobQueue>,
    thread: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Creates a runtime with default settings.
    pub fn new() -> io::Result<Self> {
        RuntimeBuilder::new().build()
    }

    pub(crate) fn start(name: String, stack_size: Option<usize>) -> io::Result<Self> {
        let queue = Arc::new(JobQueue::new());
        let thread = driver::spawn(queue.clone(), name, stack_size)?;

        Ok(Self {
            queue,
            thread: Some(thread),
        })
    }

    /// Returns a handle that schedules onto this runtime.
    pub fn handle(&self) -> Handle {
        Handle::from_arc(self.queue.clone())
    }

    /// Runs `function` with this runtime as the current scheduler.
    pub fn enter<F, R>(&self, function: F) -> R
    where
        F: FnOnce() -> R,
    {
        enter_context(self.handle(), function)
    }

    /// Stops the driver after it drains the queue, and waits for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.queue.shutdown();

        if let Some(thread) = self.thread.take() {
            // A job dropping its own runtime cannot join the thread it runs on.
            if thread.thread().id() != thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.stop();
    }
}
