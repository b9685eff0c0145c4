//! Awaiting a promise from async code.

use super::Promise;
use crate::value::Value;

use futures::task::AtomicWaker;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Future returned by [`Promise::settled`].
///
/// The first poll registers an ordinary reaction on the promise, so the
/// future completes on the turn that reaction runs, never earlier. The
/// promise's scheduler has to be driven for that to happen.
#[must_use = "futures do nothing unless polled"]
pub struct Settled {
    promise: Promise,
    slot: Option<Arc<Slot>>,
}

#[derive(Default)]
struct Slot {
    outcome: Mutex<Option<Result<Value, Value>>>,
    waker: AtomicWaker,
}

impl Settled {
    pub(crate) fn new(promise: Promise) -> Self {
        Self {
            promise,
            slot: None,
        }
    }

    fn slot(&mut self) -> Arc<Slot> {
        if let Some(slot) = &self.slot {
            return slot.clone();
        }

        let slot = Arc::new(Slot::default());
        let sink = slot.clone();
        self.promise.enqueue(Box::new(move |outcome| {
            *sink.outcome.lock() = Some(outcome);
            sink.waker.wake();
        }));

        self.slot = Some(slot.clone());
        slot
    }
}

impl Future for Settled {
    type Output = Result<Value, Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let slot = self.slot();

        // Register before looking, so a reaction running in between still
        // finds a waker to wake.
        slot.waker.register(cx.waker());

        match slot.outcome.lock().take() {
            Some(outcome) => Poll::Ready(outcome),
            None => Poll::Pending,
        }
    }
}
