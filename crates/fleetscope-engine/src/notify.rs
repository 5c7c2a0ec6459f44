//! Bounded, lossy change-notification queue
//!
//! Delivery is at-most-once and best-effort. `publish` never blocks and
//! never fails the write that produced the event: when the buffer is full
//! or the receiver is gone the event is dropped, counted, and logged at
//! `warn`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fleetscope_core::{ChangeSink, Delivery, EntityEvent};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Default buffer size when none is configured
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

/// Sending half; cheap to clone
#[derive(Debug, Clone)]
pub struct ChangeQueue {
    sender: mpsc::Sender<EntityEvent>,
    counters: Arc<Counters>,
}

/// Receiving half, drained by whoever consumes change events
#[derive(Debug)]
pub struct ChangeReceiver {
    receiver: mpsc::Receiver<EntityEvent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dropped: u64,
}

impl ChangeQueue {
    /// Create a queue holding at most `capacity` undelivered events
    ///
    /// A capacity of zero is raised to one.
    pub fn bounded(capacity: usize) -> (Self, ChangeReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let queue = Self {
            sender,
            counters: Arc::new(Counters::default()),
        };
        (queue, ChangeReceiver { receiver })
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl ChangeSink for ChangeQueue {
    fn publish(&self, event: EntityEvent) -> Delivery {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                Delivery::Enqueued
            }
            Err(TrySendError::Full(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    kind = event.kind_name(),
                    entity_id = event.subject_id(),
                    reason = "full",
                    "change event dropped"
                );
                Delivery::Dropped
            }
            Err(TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    kind = event.kind_name(),
                    entity_id = event.subject_id(),
                    reason = "closed",
                    "change event dropped"
                );
                Delivery::Dropped
            }
        }
    }
}

impl ChangeReceiver {
    /// Next event; `None` once every sender is gone and the buffer is empty
    pub async fn recv(&mut self) -> Option<EntityEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<EntityEvent> {
        self.receiver.try_recv().ok()
    }

    /// Everything currently buffered, without waiting
    pub fn drain(&mut self) -> Vec<EntityEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetscope_core::{ChangeKind, Project};

    fn event(id: &str) -> EntityEvent {
        EntityEvent::Project {
            change: ChangeKind::Updated,
            project: Project::explicit(id, "t", ["e1"]),
        }
    }

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let (queue, mut rx) = ChangeQueue::bounded(4);
        assert_eq!(queue.publish(event("p1")), Delivery::Enqueued);
        assert_eq!(queue.publish(event("p2")), Delivery::Enqueued);

        assert_eq!(rx.recv().await.unwrap().subject_id(), "p1");
        assert_eq!(rx.recv().await.unwrap().subject_id(), "p2");
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (queue, mut rx) = ChangeQueue::bounded(1);
        assert_eq!(queue.publish(event("p1")), Delivery::Enqueued);
        assert_eq!(queue.publish(event("p2")), Delivery::Dropped);

        assert_eq!(queue.stats(), QueueStats { enqueued: 1, dropped: 1 });
        let drained = rx.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].subject_id(), "p1");
    }

    #[test]
    fn test_closed_receiver_drops() {
        let (queue, rx) = ChangeQueue::bounded(4);
        drop(rx);
        assert_eq!(queue.publish(event("p1")), Delivery::Dropped);
    }

    #[test]
    fn test_recv_ends_when_senders_gone() {
        let (queue, mut rx) = ChangeQueue::bounded(2);
        queue.publish(event("p1"));
        drop(queue);

        tokio_test::block_on(async {
            assert!(rx.recv().await.is_some());
            assert!(rx.recv().await.is_none());
        });
    }
}
