//! Per-target completion latch.
//!
//! Counts in-flight transitions: `started` increments, `finished`
//! decrements, and the latch settles when the count returns to zero after at
//! least one start. `interrupt` settles it at once. A latch settles exactly
//! once; later calls are ignored.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use tracing::trace;

/// How a latch settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Every started transition finished, or the step was resolved
    /// explicitly.
    Finished,
    /// The target was detached or its animation cancelled.
    Interrupted,
}

#[derive(Debug)]
struct LatchState {
    in_flight: u32,
    started: bool,
    sender: Option<oneshot::Sender<Settled>>,
}

/// Shared handle; clones observe the same count.
#[derive(Debug, Clone)]
pub struct CompletionLatch {
    state: Rc<RefCell<LatchState>>,
}

impl CompletionLatch {
    /// Create a latch and the receiver it settles.
    pub fn new() -> (Self, oneshot::Receiver<Settled>) {
        let (sender, receiver) = oneshot::channel();
        let latch = Self {
            state: Rc::new(RefCell::new(LatchState {
                in_flight: 0,
                started: false,
                sender: Some(sender),
            })),
        };
        (latch, receiver)
    }

    pub fn started(&self) {
        let mut state = self.state.borrow_mut();
        if state.sender.is_none() {
            return;
        }
        state.in_flight += 1;
        state.started = true;
        trace!(in_flight = state.in_flight, "latch started");
    }

    pub fn finished(&self) {
        let settle = {
            let mut state = self.state.borrow_mut();
            state.in_flight = state.in_flight.saturating_sub(1);
            trace!(in_flight = state.in_flight, "latch finished");
            state.started && state.in_flight == 0
        };
        if settle {
            self.settle(Settled::Finished);
        }
    }

    /// Settle without waiting for notifications.
    pub fn resolve(&self) {
        self.settle(Settled::Finished);
    }

    pub fn interrupt(&self) {
        self.settle(Settled::Interrupted);
    }

    pub fn in_flight(&self) -> u32 {
        self.state.borrow().in_flight
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().sender.is_none()
    }

    fn settle(&self, outcome: Settled) {
        let sender = self.state.borrow_mut().sender.take();
        if let Some(sender) = sender {
            trace!(?outcome, "latch settled");
            // The receiver may already be gone; nothing is waiting then.
            let _ = sender.send(outcome);
        }
    }
}

/// Await a latch receiver. A dropped latch counts as interrupted.
pub async fn settled(receiver: oneshot::Receiver<Settled>) -> Settled {
    receiver.await.unwrap_or(Settled::Interrupted)
}
