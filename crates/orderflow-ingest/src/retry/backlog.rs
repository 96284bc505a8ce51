//! Bounded retry backlog ordered by eligibility time.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tokio::time::Instant;

use super::InFlightMessage;

/// Heap entry. Ordered by `(retry_after, seq)` so that messages with the
/// same deadline come out in insertion order.
#[derive(Debug)]
struct Scheduled<V> {
    retry_after: Instant,
    seq: u64,
    message: InFlightMessage<V>,
}

impl<V> PartialEq for Scheduled<V> {
    fn eq(&self, other: &Self) -> bool {
        self.retry_after == other.retry_after && self.seq == other.seq
    }
}

impl<V> Eq for Scheduled<V> {}

impl<V> PartialOrd for Scheduled<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for Scheduled<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.retry_after
            .cmp(&other.retry_after)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of failed messages waiting for their backoff to elapse.
///
/// The earliest-eligible message is always at the top, so a single peek
/// decides whether anything can be retried now.
#[derive(Debug)]
pub struct RetryBacklog<V> {
    heap: BinaryHeap<Reverse<Scheduled<V>>>,
    capacity: usize,
    next_seq: u64,
}

impl<V> RetryBacklog<V> {
    /// Creates an empty backlog holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Schedules a message.
    ///
    /// Hands the message back when the backlog is full so the caller can
    /// dead-letter it. A message without a deadline is eligible at once.
    pub fn push(&mut self, message: InFlightMessage<V>) -> Result<(), InFlightMessage<V>> {
        if self.heap.len() >= self.capacity {
            return Err(message);
        }

        let retry_after = message.retry_after().unwrap_or_else(Instant::now);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            retry_after,
            seq,
            message,
        }));
        Ok(())
    }

    /// Removes and returns the earliest message if it is eligible at `now`.
    pub fn pop_eligible(&mut self, now: Instant) -> Option<InFlightMessage<V>> {
        let Reverse(top) = self.heap.peek()?;
        if top.retry_after > now {
            return None;
        }
        self.heap.pop().map(|Reverse(scheduled)| scheduled.message)
    }

    /// Deadline of the earliest scheduled message.
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(top)| top.retry_after)
    }

    /// Number of scheduled messages.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Maximum number of scheduled messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if a push would be rejected.
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }
}
