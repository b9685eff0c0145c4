//! The settlement state machine behind every promise.
//!
//! A cell starts `Pending`, moves to `Adopting` once a resolution claims it,
//! and ends `Fulfilled` or `Rejected`. The terminal transition
//! happens at most once, under the cell's lock, and hands the queued
//! reactions to the scheduler in registration order.

use super::Promise;
use crate::runtime::Handle;
use crate::value::Value;

use parking_lot::Mutex;
use std::cell::RefCell;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Reaction lists released while another release is running on this
    // thread. `None` when no release is in progress.
    static RELEASED: RefCell<Option<Vec<Vec<Reaction>>>> = const { RefCell::new(None) };
}

/// A reaction waiting for the terminal outcome. `Ok` is the fulfillment
/// value, `Err` the rejection reason.
pub(crate) type Reaction = Box<dyn FnOnce(Result<Value, Value>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Pending,
    /// Claimed by a resolution. The value is being probed, or the cell
    /// follows another promise whose outcome has not arrived yet.
    Adopting,
    Fulfilled,
    Rejected,
}

impl Status {
    fn is_terminal(self) -> bool {
        matches!(self, Status::Fulfilled | Status::Rejected)
    }
}

struct State {
    status: Status,
    result: Value,
    // Empty once terminal.
    reactions: Vec<Reaction>,
}

pub(crate) struct Cell {
    pub(crate) id: u64,
    pub(crate) scheduler: Handle,
    state: Mutex<State>,
}

impl Cell {
    pub(crate) fn new(scheduler: Handle) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            scheduler,
            state: Mutex::new(State {
                status: Status::Pending,
                result: Value::Undefined,
                reactions: Vec::new(),
            }),
        }
    }
}

impl Drop for Cell {
    fn drop(&mut self) {
        let reactions = mem::take(&mut self.state.get_mut().reactions);
        if !reactions.is_empty() {
            release(reactions);
        }
    }
}

/// Drops a reaction list without nesting.
///
/// A pending reaction owns the promise it settles, whose cell owns its own
/// reactions, so dropping the head of a pending chain would otherwise recurse
/// once per link. Lists released while a release is running are queued and
/// dropped by the outermost call.
fn release(reactions: Vec<Reaction>) {
    let outermost = RELEASED.try_with(|released| {
        let mut released = released.borrow_mut();
        match released.as_mut() {
            Some(queued) => {
                queued.push(reactions);
                None
            }
            None => {
                *released = Some(Vec::new());
                Some(reactions)
            }
        }
    });

    // Thread-local storage is gone during thread teardown; drop in place.
    let Ok(Some(mut batch)) = outermost else {
        return;
    };

    loop {
        drop(batch);
        let next = RELEASED.with(|released| released.borrow_mut().as_mut().and_then(Vec::pop));
        match next {
            Some(reactions) => batch = reactions,
            None => break,
        }
    }

    RELEASED.with(|released| *released.borrow_mut() = None);
}

impl Promise {
    pub(crate) fn status(&self) -> Status {
        self.cell.state.lock().status
    }

    /// First-wins fulfillment entry point: claims a pending cell and runs
    /// the resolution procedure on `value`.
    ///
    /// The claim happens before `value` is probed, so a losing attempt never
    /// reads or calls a thenable's `then`.
    pub(crate) fn settle_success(&self, value: Value) {
        if self.transition(Status::Pending, Status::Adopting) {
            self.resolve_from(value);
        }
    }

    /// First-wins rejection entry point.
    pub(crate) fn settle_failure(&self, reason: Value) {
        self.complete(Status::Pending, Err(reason));
    }

    /// Fulfills a pending cell with a value already known to be plain.
    pub(crate) fn fulfill(&self, value: Value) {
        self.complete(Status::Pending, Ok(value));
    }

    /// Moves the cell from `from` to `to`. Fails if another settlement got
    /// there first.
    pub(crate) fn transition(&self, from: Status, to: Status) -> bool {
        let mut state = self.cell.state.lock();
        if state.status != from {
            return false;
        }
        state.status = to;
        true
    }

    /// Makes the cell terminal if it is still in `from`, then schedules every
    /// queued reaction with the outcome.
    pub(crate) fn complete(&self, from: Status, outcome: Result<Value, Value>) {
        let reactions = {
            let mut state = self.cell.state.lock();
            if state.status != from {
                return;
            }

            let (status, result) = match &outcome {
                Ok(value) => (Status::Fulfilled, value.clone()),
                Err(reason) => (Status::Rejected, reason.clone()),
            };
            state.status = status;
            state.result = result;

            mem::take(&mut state.reactions)
        };

        trace!(
            promise = self.id(),
            fulfilled = outcome.is_ok(),
            reactions = reactions.len(),
            "promise settled"
        );

        for reaction in reactions {
            let outcome = outcome.clone();
            self.cell.scheduler.schedule(move || reaction(outcome));
        }
    }

    /// Registers `reaction` for the terminal outcome.
    ///
    /// On a cell that is already terminal the reaction is scheduled right
    /// away. It still never runs inside this call.
    pub(crate) fn enqueue(&self, reaction: Reaction) {
        let mut state = self.cell.state.lock();

        if !state.status.is_terminal() {
            state.reactions.push(reaction);
            return;
        }

        let outcome = match state.status {
            Status::Fulfilled => Ok(state.result.clone()),
            _ => Err(state.result.clone()),
        };
        drop(state);

        trace!(promise = self.id(), "reaction on settled promise");
        self.cell.scheduler.schedule(move || reaction(outcome));
    }
}
