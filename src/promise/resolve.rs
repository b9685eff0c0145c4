//! The resolution procedure.
//!
//! Decides whether a value is a promise, a foreign thenable or a plain value,
//! and settles a cell accordingly. Thenables are wrapped in a promise whose
//! setup calls their `then` on a later turn, so adopting a thenable looks
//! exactly like adopting a promise, and a hostile `then` never runs on the
//! resolving caller's stack.
//!
//! Nesting never deepens the call stack: each level of adoption is one
//! reaction, and reactions run one per scheduler turn.

use super::Promise;
use super::cell::{Reaction, Status};
use crate::error::Error;
use crate::runtime::Handle;
use crate::value::Value;

use tracing::debug;

/// Marks a value thrown while reading a `then` property.
///
/// Keeps "probing the value failed" apart from "the value is plain". It is
/// unwrapped back to the thrown value before anyone else sees it.
#[derive(Debug)]
pub(crate) struct ProbeError(Value);

impl ProbeError {
    pub(crate) fn into_inner(self) -> Value {
        self.0
    }
}

/// Returns the promise `value` should be adopted from, if any.
///
/// Promises come back as they are. A thenable comes back wrapped in a fresh
/// promise on `handle`. Plain values yield `None`.
pub(crate) fn coerce(value: &Value, handle: &Handle) -> Result<Option<Promise>, ProbeError> {
    let object = match value {
        Value::Promise(promise) => return Ok(Some(promise.clone())),
        Value::Object(object) => object,
        _ => return Ok(None),
    };

    let then = match object.get("then") {
        Ok(Value::Function(then)) => then,
        Ok(_) => return Ok(None),
        Err(thrown) => {
            debug!(reason = ?thrown, "reading then threw");
            return Err(ProbeError(thrown));
        }
    };

    let scheduler = handle.clone();
    let wrapper = Promise::new_in(handle, move |resolve, reject| {
        scheduler.schedule(move || {
            if let Err(thrown) = then.call(&[Value::from(resolve), Value::from(reject.clone())]) {
                reject.call(thrown);
            }
        });
        Ok(())
    });

    Ok(Some(wrapper))
}

impl Promise {
    /// Settles this cell, already claimed as `Adopting`, with the eventual
    /// outcome of `value`.
    pub(crate) fn resolve_from(&self, value: Value) {
        let source = match coerce(&value, self.handle()) {
            Ok(Some(source)) => source,
            Ok(None) => return self.complete(Status::Adopting, Ok(value)),
            Err(probe) => return self.complete(Status::Adopting, Err(probe.into_inner())),
        };

        if source.ptr_eq(self) {
            debug!(promise = self.id(), "promise resolved with itself");
            return self.complete(Status::Adopting, Err(Error::ChainingCycle.into()));
        }

        let target = self.clone();
        source.enqueue(Box::new(move |outcome| match outcome {
            Ok(value) => target.resolve_from(value),
            Err(reason) => target.complete(Status::Adopting, Err(reason)),
        }));
    }

    /// Lets this cell be settled by `value` without checking whether the
    /// cell is still pending first.
    ///
    /// Every promise or thenable passed here gets a reaction attached (and a
    /// thenable gets its `then` called) even after the cell has settled.
    /// Combinators rely on this to touch every input exactly once.
    pub(crate) fn follow(&self, value: Value) {
        match coerce(&value, self.handle()) {
            Ok(Some(source)) => source.enqueue(self.settler()),
            Ok(None) => self.settle_success(value),
            Err(probe) => self.settle_failure(probe.into_inner()),
        }
    }

    /// A reaction that forwards an outcome into this cell's first-wins entry
    /// points.
    pub(crate) fn settler(&self) -> Reaction {
        let target = self.clone();
        Box::new(move |outcome| match outcome {
            Ok(value) => target.settle_success(value),
            Err(reason) => target.settle_failure(reason),
        })
    }
}
