//! Synapse delivery queue
//!
//! Deliveries are ordered by delivery time; entries sharing a time bucket
//! drain in FIFO insertion order so that repeated runs apply identical
//! effects in an identical order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use stick_core::Channel;

/// A pending synaptic delivery onto a neuron state slot
#[derive(Debug, Clone)]
pub(crate) struct DeliveryEvent {
    /// Delivery time (ms)
    pub time: f64,
    /// Insertion sequence, breaks ties within a time bucket
    pub seq: u64,
    /// Dense index of the target neuron
    pub target: usize,
    /// Channel the weight lands on
    pub channel: Channel,
    /// Delivered weight
    pub weight: f64,
}

impl PartialEq for DeliveryEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DeliveryEvent {}

impl PartialOrd for DeliveryEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeliveryEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of pending deliveries keyed by `(time, seq)`
#[derive(Debug, Default)]
pub(crate) struct DeliveryQueue {
    heap: BinaryHeap<Reverse<DeliveryEvent>>,
    next_seq: u64,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a delivery
    pub fn push(&mut self, time: f64, target: usize, channel: Channel, weight: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(DeliveryEvent {
            time,
            seq,
            target,
            channel,
            weight,
        }));
    }

    /// Pop the next delivery if it is due at or before `deadline`
    pub fn pop_due(&mut self, deadline: f64) -> Option<DeliveryEvent> {
        let due = match self.heap.peek() {
            Some(Reverse(ev)) => ev.time <= deadline,
            None => false,
        };
        if due {
            self.heap.pop().map(|Reverse(ev)| ev)
        } else {
            None
        }
    }

    /// Number of pending deliveries
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ordering() {
        let mut q = DeliveryQueue::new();
        q.push(2.0, 0, Channel::V, 1.0);
        q.push(1.0, 1, Channel::V, 1.0);
        q.push(3.0, 2, Channel::V, 1.0);

        assert_eq!(q.pop_due(10.0).unwrap().target, 1);
        assert_eq!(q.pop_due(10.0).unwrap().target, 0);
        assert_eq!(q.pop_due(10.0).unwrap().target, 2);
        assert!(q.pop_due(10.0).is_none());
    }

    #[test]
    fn test_fifo_within_bucket() {
        let mut q = DeliveryQueue::new();
        q.push(1.0, 7, Channel::Ge, 0.5);
        q.push(1.0, 8, Channel::Ge, -0.5);
        q.push(1.0, 9, Channel::Gate, 1.0);

        let order: Vec<usize> = std::iter::from_fn(|| q.pop_due(1.0)).map(|e| e.target).collect();
        assert_eq!(order, vec![7, 8, 9]);
    }

    #[test]
    fn test_deadline_holds_back_future_events() {
        let mut q = DeliveryQueue::new();
        q.push(5.0, 0, Channel::V, 1.0);
        assert!(q.pop_due(4.99).is_none());
        assert_eq!(q.len(), 1);
        assert!(q.pop_due(5.0).is_some());
    }
}
