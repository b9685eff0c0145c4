//! Deferred scheduling for promise reactions.
//!
//! Promises never run a reaction on the caller's stack. Every reaction is
//! handed to a [`Schedule`] implementation as a [`Job`] and runs later, in FIFO
//! order. Two schedulers ship with the crate:
//!
//! - [`ManualScheduler`]: a queue the caller steps explicitly, for tests and
//!   embedders that own their event loop.
//! - [`Runtime`]: a background driver thread draining the queue.

pub(crate) mod context;
mod core;
mod driver;
mod manual;
pub(crate) mod queue;

pub(crate) use context::{current, enter_context};
pub use self::core::Runtime;
pub use manual::ManualScheduler;
pub(crate) use queue::JobQueue;

use std::fmt;
use std::sync::Arc;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The deferred-callback primitive promises depend on.
///
/// Implementations must run jobs in the order they were scheduled, and must
/// never run a job inside the call to [`Schedule::schedule`] itself.
pub trait Schedule: Send + Sync {
    fn schedule(&self, job: Job);
}

/// A cloneable reference to a scheduler.
#[derive(Clone)]
pub struct Handle(Arc<dyn Schedule>);

impl Handle {
    /// Wraps a custom scheduler, such as one backed by an embedder's event
    /// loop.
    pub fn new(scheduler: impl Schedule + 'static) -> Self {
        Handle(Arc::new(scheduler))
    }

    pub(crate) fn from_arc(scheduler: Arc<dyn Schedule>) -> Self {
        Handle(scheduler)
    }

    /// Defers `job` to a later turn.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        self.0.schedule(Box::new(job));
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}
