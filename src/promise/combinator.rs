//! Aggregation over arrays of promises, thenables and plain values.

use super::Promise;
use super::resolve::coerce;
use crate::error::{Error, Result};
use crate::runtime;
use crate::value::{Array, Value};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

// Progress of an `all` whose slots are still arriving.
struct Gather {
    slots: Vec<Option<Value>>,
    fulfilled: usize,
}

impl Promise {
    /// Settles like whichever element of `values` settles first.
    ///
    /// Every element is adopted, including those that lose: each thenable
    /// has its `then` called exactly once. Holes count as
    /// [`Value::Undefined`]. An empty array yields a promise that never
    /// settles.
    ///
    /// # Errors
    /// [`Error::NotASequence`] if `values` is not an array.
    pub fn race(values: impl Into<Value>) -> Result<Promise> {
        let Value::Array(values) = values.into() else {
            return Err(Error::NotASequence);
        };

        let race = Promise::pending(runtime::current());
        for slot in values.slots() {
            race.follow(slot.clone().unwrap_or_default());
        }

        Ok(race)
    }

    /// Fulfills with an array of every element's value, in input order, or
    /// rejects with the first rejection.
    ///
    /// Plain values are copied through. Holes stay holes. The input array is
    /// never modified; the result is always a new array.
    ///
    /// # Errors
    /// [`Error::NotASequence`] if `values` is not an array.
    pub fn all(values: impl Into<Value>) -> Result<Promise> {
        let Value::Array(values) = values.into() else {
            return Err(Error::NotASequence);
        };

        let handle = runtime::current();
        let combined = Promise::pending(handle.clone());
        let slots = values.slots().to_vec();

        // Count every source before attaching anything, so a source that
        // settles on another thread cannot complete the gather early.
        let mut sources = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            let Some(value) = slot else {
                continue;
            };
            match coerce(value, &handle) {
                Ok(Some(source)) => sources.push((index, source)),
                Ok(None) => {}
                Err(probe) => combined.settle_failure(probe.into_inner()),
            }
        }

        if sources.is_empty() {
            combined.settle_success(Array::with_holes(slots).into());
            return Ok(combined);
        }

        let expected = sources.len();
        trace!(promise = combined.id(), expected, "gathering");
        let gather = Arc::new(Mutex::new(Gather {
            slots,
            fulfilled: 0,
        }));

        for (index, source) in sources {
            let target = combined.clone();
            let gather = gather.clone();

            source.enqueue(Box::new(move |outcome| match outcome {
                Ok(value) => {
                    let done = {
                        let mut gather = gather.lock();
                        gather.slots[index] = Some(value);
                        gather.fulfilled += 1;
                        (gather.fulfilled == expected).then(|| std::mem::take(&mut gather.slots))
                    };
                    if let Some(slots) = done {
                        target.settle_success(Array::with_holes(slots).into());
                    }
                }
                Err(reason) => target.settle_failure(reason),
            }));
        }

        Ok(combined)
    }
}
