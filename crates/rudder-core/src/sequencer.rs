#![forbid(unsafe_code)]

//! Serialized, animation-gated mutation queue.
//!
//! The original model for "wait out the animation" is cooperative
//! suspension on one logical execution context. This core replaces it with
//! an explicit lifecycle: every submitted operation is *requested*
//! (queued), becomes *applying* when its owner takes it and mutates state,
//! and is *settled* either immediately (unanimated) or when the render
//! surface confirms the visual transition finished.
//!
//! Owners drain with a loop of [`take_ready`](TransitionSequencer::take_ready),
//! applying each operation as it comes out; an operation that must wait out
//! an animation calls [`hold`](TransitionSequencer::hold), which blocks the
//! queue until [`settle`](TransitionSequencer::settle).
//!
//! # Invariants
//!
//! 1. At most one operation is in flight per sequencer at any instant.
//! 2. Operations apply strictly in submission order; nothing is dropped,
//!    superseded, or reordered (fire-and-forget, no cancellation).
//! 3. An operation that never calls `hold` never blocks the queue.
//! 4. A held operation whose settle confirmation never arrives blocks the
//!    queue permanently; only [`reset`](TransitionSequencer::reset)
//!    (owner teardown) recovers.
//!
//! # Failure Modes
//!
//! - `settle()` with nothing in flight returns `false` (benign; e.g. a
//!   render surface confirming after a teardown already reset the queue).

use std::collections::VecDeque;

/// FIFO queue of pending operations with a single in-flight slot.
///
/// `Op` is the owner's operation data; the sequencer never interprets it.
#[derive(Debug)]
pub struct TransitionSequencer<Op> {
    queue: VecDeque<Op>,
    in_flight: bool,
}

impl<Op> Default for TransitionSequencer<Op> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Op> TransitionSequencer<Op> {
    /// Create an idle sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            in_flight: false,
        }
    }

    /// Queue an operation behind everything already submitted.
    pub fn submit(&mut self, op: Op) {
        self.queue.push_back(op);
    }

    /// Take the next operation, unless one is still in flight.
    pub fn take_ready(&mut self) -> Option<Op> {
        if self.in_flight {
            return None;
        }
        self.queue.pop_front()
    }

    /// Mark the operation just taken as gated on an animation: the queue
    /// stays blocked until [`settle`](Self::settle).
    pub fn hold(&mut self) {
        self.in_flight = true;
    }

    /// Confirm the in-flight operation's transition finished.
    ///
    /// Returns whether an operation was actually in flight.
    pub fn settle(&mut self) -> bool {
        let was = self.in_flight;
        self.in_flight = false;
        was
    }

    /// Drop all pending operations and any in-flight marker. Used only by
    /// owner teardown (`clean`), never by normal operation flow.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.in_flight = false;
    }

    /// Whether an operation has applied but not yet settled.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Number of operations still waiting to apply.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Idle: nothing queued, nothing in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.in_flight && self.queue.is_empty()
    }
}
