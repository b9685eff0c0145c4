//! The chaining operator.
//!
//! `then` derives a new promise from a source promise and a pair of
//! handlers. The derived promise exists as soon as `then` returns; the
//! handler runs on a later turn, once the source has settled, and its result
//! is fed back through the resolution procedure.

use super::Promise;
use crate::error::Error;
use crate::value::{Function, Value};

use tracing::debug;

impl Promise {
    /// Registers handlers for this promise's outcome and returns the promise
    /// of their result.
    ///
    /// A non-callable `on_fulfilled` passes the value through unchanged. A
    /// non-callable `on_rejected` passes the rejection through unchanged.
    ///
    /// The handler's result settles the returned promise:
    /// - `Err(thrown)` rejects it with `thrown`;
    /// - returning the returned promise itself rejects it with
    ///   [`Error::ChainingCycle`];
    /// - anything else is resolved, so promises and thenables are adopted.
    ///
    /// # Example
    /// ```ignore
    /// let next = promise.then(Function::unary(|v| Ok(v)), ());
    /// ```
    pub fn then(&self, on_fulfilled: impl Into<Value>, on_rejected: impl Into<Value>) -> Promise {
        let on_fulfilled = callable(on_fulfilled.into());
        let on_rejected = callable(on_rejected.into());

        let derived = Promise::pending(self.handle().clone());
        let target = derived.clone();

        self.enqueue(Box::new(move |outcome| {
            let returned = match outcome {
                Ok(value) => match on_fulfilled {
                    Some(handler) => handler.call(&[value]),
                    None => Ok(value),
                },
                Err(reason) => match on_rejected {
                    Some(handler) => handler.call(&[reason]),
                    None => Err(reason),
                },
            };

            match returned {
                Err(thrown) => target.settle_failure(thrown),
                Ok(Value::Promise(promise)) if promise.ptr_eq(&target) => {
                    debug!(promise = target.id(), "handler returned its own promise");
                    target.settle_failure(Error::ChainingCycle.into());
                }
                Ok(value) => target.settle_success(value),
            }
        }));

        derived
    }

    /// Registers a rejection handler. Same as `then((), on_rejected)`.
    pub fn catch(&self, on_rejected: impl Into<Value>) -> Promise {
        self.then(Value::Undefined, on_rejected)
    }
}

fn callable(value: Value) -> Option<Function> {
    match value {
        Value::Function(function) => Some(function),
        _ => None,
    }
}
