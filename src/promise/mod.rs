//! Promises: values that settle exactly once, at some later time.
//!
//! A producer builds a [`Promise`] from a setup routine that receives
//! [`Resolve`] and [`Reject`] capabilities. Consumers chain reactions with
//! [`Promise::then`] and [`Promise::catch`], or combine promises with
//! [`Promise::race`] and [`Promise::all`].
//!
//! # Guarantees
//!
//! 1. Only the first settlement attempt on a promise has any effect.
//! 2. Reactions always run through the scheduler, never on the stack that
//!    registered them or settled the promise, even if the promise was already
//!    settled at registration time.
//! 3. Reactions registered on one promise run in registration order.
//! 4. Resolving with another promise or with a thenable adopts its eventual
//!    outcome, however deeply nested.
//!
//! # Example
//!
//! ```ignore
//! use promise::{Function, ManualScheduler, Promise, Value};
//!
//! let scheduler = ManualScheduler::new();
//! scheduler.enter(|| {
//!     Promise::new(|resolve, _reject| {
//!         resolve.call(1);
//!         Ok(())
//!     })
//!     .then(Function::unary(|v| Ok(Value::from(v.as_number().unwrap_or(0.0) + 1.0))), ());
//! });
//! scheduler.run_until_idle();
//! ```

mod cell;
mod chain;
mod combinator;
mod resolve;
mod settled;

pub use settled::Settled;

use crate::runtime::{self, Handle};
use crate::value::{Function, Value};

use cell::Cell;
use std::fmt;
use std::sync::Arc;

/// A deferred value that is eventually fulfilled or rejected.
///
/// Cloning a `Promise` clones a reference to the same settlement cell.
#[derive(Clone)]
pub struct Promise {
    cell: Arc<Cell>,
}

impl Promise {
    /// Creates a promise on the current scheduler and runs `setup` on it.
    ///
    /// `setup` runs synchronously, before `new` returns. Returning `Err` is
    /// equivalent to calling [`Reject::call`] with the error, unless `setup`
    /// already settled the promise, in which case the error is discarded.
    pub fn new<F>(setup: F) -> Promise
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        Promise::new_in(&runtime::current(), setup)
    }

    /// Like [`Promise::new`], on an explicit scheduler.
    pub fn new_in<F>(handle: &Handle, setup: F) -> Promise
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        let promise = Promise::pending(handle.clone());

        if let Err(thrown) = setup(Resolve(promise.clone()), Reject(promise.clone())) {
            promise.settle_failure(thrown);
        }

        promise
    }

    /// Returns a promise that adopts `value`.
    ///
    /// A promise is returned as is. A thenable yields a promise that follows
    /// it. Anything else yields a promise fulfilled with `value`.
    pub fn resolve(value: impl Into<Value>) -> Promise {
        let value = value.into();
        let handle = runtime::current();

        match resolve::coerce(&value, &handle) {
            Ok(Some(promise)) => promise,
            Ok(None) => {
                let promise = Promise::pending(handle);
                promise.fulfill(value);
                promise
            }
            Err(probe) => {
                let promise = Promise::pending(handle);
                promise.settle_failure(probe.into_inner());
                promise
            }
        }
    }

    /// Returns a promise rejected with `reason`, verbatim.
    ///
    /// A promise or thenable passed here becomes the reason itself; it is not
    /// adopted.
    pub fn reject(reason: impl Into<Value>) -> Promise {
        let promise = Promise::pending(runtime::current());
        promise.settle_failure(reason.into());
        promise
    }

    /// Returns `true` if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Returns a future that completes with this promise's outcome.
    ///
    /// `Ok` carries the fulfillment value, `Err` the rejection reason.
    pub fn settled(&self) -> Settled {
        Settled::new(self.clone())
    }

    pub(crate) fn pending(handle: Handle) -> Promise {
        Promise {
            cell: Arc::new(Cell::new(handle)),
        }
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.cell.scheduler
    }

    pub(crate) fn id(&self) -> u64 {
        self.cell.id
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Promise").field(&self.id()).finish()
    }
}

/// Capability to fulfill a promise, handed to its setup routine.
///
/// Calls after the promise has settled (or started adopting another promise)
/// are ignored.
#[derive(Clone, Debug)]
pub struct Resolve(Promise);

impl Resolve {
    /// Resolves the promise with `value`.
    ///
    /// # Arguments
    /// * `value` - A plain value fulfills the promise. A promise or thenable
    ///   is adopted, so the promise settles as it eventually does.
    pub fn call(&self, value: impl Into<Value>) {
        self.0.settle_success(value.into());
    }
}

impl From<Resolve> for Function {
    fn from(resolve: Resolve) -> Self {
        Function::unary(move |value| {
            resolve.call(value);
            Ok(Value::Undefined)
        })
    }
}

impl From<Resolve> for Value {
    fn from(resolve: Resolve) -> Self {
        Value::Function(resolve.into())
    }
}

/// Capability to reject a promise, handed to its setup routine.
///
/// Calls after the promise has settled are ignored.
#[derive(Clone, Debug)]
pub struct Reject(Promise);

impl Reject {
    /// Rejects the promise with `reason`, verbatim.
    pub fn call(&self, reason: impl Into<Value>) {
        self.0.settle_failure(reason.into());
    }
}

impl From<Reject> for Function {
    fn from(reject: Reject) -> Self {
        Function::unary(move |reason| {
            reject.call(reason);
            Ok(Value::Undefined)
        })
    }
}

impl From<Reject> for Value {
    fn from(reject: Reject) -> Self {
        Value::Function(reject.into())
    }
}
