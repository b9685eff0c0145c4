//! Thread-safe FIFO queue of deferred jobs.
//!
//! Backs both schedulers. The manual scheduler only pushes and pops; the
//! driver thread additionally parks on the condition variable while the
//! queue is empty.

use crate::runtime::{Job, Schedule};

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

/// A FIFO queue of jobs waiting for their turn.
pub(crate) struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    ready: Condvar,
    shutdown: AtomicBool,
}

impl JobQueue {
    pub(crate) fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Appends a job and wakes one parked driver, if any.
    pub(crate) fn push(&self, job: Job) {
        self.jobs.lock().push_back(job);
        self.ready.notify_one();
    }

    /// Removes the job at the front of the queue.
    pub(crate) fn pop(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }

    /// Blocks until a job is available.
    ///
    /// Returns `None` once shutdown was requested and every job queued before
    /// that point has been handed out.
    pub(crate) fn wait_pop(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock();
        loop {
            if let Some(job) = jobs.pop_front() {
                return Some(job);
            }
            if self.is_shutdown() {
                return None;
            }
            self.ready.wait(&mut jobs);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Signals the driver thread to stop once the queue is drained.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Taking the lock orders the store before a driver's emptiness check.
        let _jobs = self.jobs.lock();
        self.ready.notify_all();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule for JobQueue {
    fn schedule(&self, job: Job) {
        self.push(job);
    }
}
