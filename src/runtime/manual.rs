//! A scheduler stepped by its owner.
//!
//! Nothing runs until [`ManualScheduler::tick`] or
//! [`ManualScheduler::run_until_idle`] is called, which makes the order of
//! every deferred reaction observable and deterministic.

use crate::runtime::{Handle, JobQueue, enter_context};

use std::sync::Arc;
use tracing::trace;

/// A FIFO job queue driven by explicit calls.
///
/// # Example
/// ```ignore
/// let scheduler = ManualScheduler::new();
/// let promise = scheduler.enter(|| Promise::resolve(1));
/// scheduler.run_until_idle();
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<JobQueue>,
}

impl ManualScheduler {
    /// Creates a scheduler with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that schedules onto this queue.
    pub fn handle(&self) -> Handle {
        Handle::from_arc(self.queue.clone())
    }

    /// Runs `function` with this scheduler as the current one.
    pub fn enter<F, R>(&self, function: F) -> R
    where
        F: FnOnce() -> R,
    {
        enter_context(self.handle(), function)
    }

    /// Runs the oldest queued job, if any.
    ///
    /// Returns `false` when the queue was empty.
    pub fn tick(&self) -> bool {
        let Some(job) = self.queue.pop() else {
            return false;
        };

        trace!(remaining = self.queue.len(), "running deferred job");
        self.enter(job);

        true
    }

    /// Runs jobs until the queue is empty, including jobs queued by jobs.
    ///
    /// Returns the number of jobs that ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.tick() {
            ran += 1;
        }
        ran
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
