//! Pending-call table: uid → single-shot reply waiter.
//!
//! Every outbound call installs a waiter here before transmission and
//! resolves through it. A waiter is settled exactly once, ever: by the
//! matching return frame, by a send failure, or by the destructor rejecting
//! everything outstanding on teardown.
//!
//! # Single-Threaded
//!
//! Uses `RefCell` plus waker-based slots - not thread-safe but efficient for
//! single-threaded async runtimes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use farcall_core::ErrorRecord;
use serde_json::Value;

use crate::error::CallError;

/// Outcome delivered into a waiter.
pub(crate) type CallOutcome = Result<Value, CallError>;

/// Table of in-flight outbound calls.
#[derive(Default)]
pub(crate) struct PendingCalls {
    slots: RefCell<HashMap<u64, Rc<ReplySlot>>>,
}

impl PendingCalls {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Install a waiter for `uid`, returning the future that resolves when
    /// the waiter is settled.
    pub(crate) fn insert(&self, uid: u64) -> ReplyFuture {
        let slot = Rc::new(ReplySlot::default());
        self.slots.borrow_mut().insert(uid, Rc::clone(&slot));
        ReplyFuture { slot }
    }

    /// Settle the waiter for `uid`, removing it from the table.
    ///
    /// Returns `false` when no such call is outstanding - a late reply after
    /// teardown, or a duplicate return frame.
    pub(crate) fn settle(&self, uid: u64, outcome: CallOutcome) -> bool {
        let slot = self.slots.borrow_mut().remove(&uid);
        match slot {
            Some(slot) => {
                slot.fulfill(outcome);
                true
            }
            None => false,
        }
    }

    /// Reject every outstanding call with `record` and empty the table.
    pub(crate) fn reject_all(&self, record: &ErrorRecord) {
        let drained: Vec<Rc<ReplySlot>> = self
            .slots
            .borrow_mut()
            .drain()
            .map(|(_, slot)| slot)
            .collect();
        for slot in drained {
            slot.fulfill(Err(CallError::Disconnected(record.clone())));
        }
    }

    /// Number of calls currently awaiting settlement.
    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().len()
    }
}

/// Single-shot slot shared between the table and its [`ReplyFuture`].
#[derive(Default)]
struct ReplySlot {
    state: RefCell<SlotState>,
}

#[derive(Default)]
struct SlotState {
    outcome: Option<CallOutcome>,
    waker: Option<Waker>,
}

impl ReplySlot {
    fn fulfill(&self, outcome: CallOutcome) {
        let waker = {
            let mut state = self.state.borrow_mut();
            if state.outcome.is_some() {
                return;
            }
            state.outcome = Some(outcome);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Future side of a pending call; resolves once the slot is settled.
pub(crate) struct ReplyFuture {
    slot: Rc<ReplySlot>,
}

impl Future for ReplyFuture {
    type Output = CallOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.slot.state.borrow_mut();
        if let Some(outcome) = state.outcome.take() {
            return Poll::Ready(outcome);
        }
        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
