use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::state::CustomerId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    Arrival,
    Departure,
}

/// A scheduled state change: a customer arriving at or departing from a
/// service point at a specific simulated time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub customer: CustomerId,
    pub target: usize,
}

impl Event {
    pub fn new(time: f64, kind: EventKind, customer: CustomerId, target: usize) -> Self {
        Self {
            time,
            kind,
            customer,
            target,
        }
    }
}

/// An event plus the insertion sequence number that makes equal-time
/// ordering deterministic. A bare min-heap on time alone would pop
/// equal-time events in arbitrary order.
#[derive(Clone, Copy, Debug)]
struct ScheduledEvent {
    seq: u64,
    event: Event,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .time
            .total_cmp(&other.event.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.event.time.total_cmp(&other.event.time) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

/// Time-ordered multiset of pending events with FIFO tie-breaking on
/// equal times.
#[derive(Debug, Default)]
pub struct EventList {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(ScheduledEvent { seq, event }));
    }

    /// Removes and returns the earliest pending event, or `None` when the
    /// list is empty. The run loop treats popping an empty list as a
    /// terminal state, not an error.
    pub fn remove_next(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(scheduled)| scheduled.event)
    }

    pub fn peek_next(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(scheduled)| &scheduled.event)
    }

    /// Time of the earliest pending event.
    pub fn next_time(&self) -> Option<f64> {
        self.peek_next().map(|event| event.time)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
