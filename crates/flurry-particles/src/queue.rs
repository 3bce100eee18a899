//! Spawn request queue shared between producers and the frame scheduler
//!
//! Producers may live on other threads (a remote feed, a replay loader); the
//! scheduler drains a bounded batch per tick. Every request is stamped with
//! the queue epoch at enqueue time. `clear()` bumps the epoch, so requests
//! that race a clear are discarded when drained, and producers bound to a
//! session stop accepting requests altogether.

use crossbeam::channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A pending request to materialize one particle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: String,
    /// Create directly in the settled state (historical/replay data)
    #[serde(default)]
    pub presettled: bool,
}

impl SpawnRequest {
    pub fn live(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            presettled: false,
        }
    }

    pub fn historical(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            presettled: true,
        }
    }
}

struct Stamped {
    epoch: u64,
    request: SpawnRequest,
}

/// Unbounded FIFO of spawn requests
pub struct SpawnQueue {
    sender: Sender<Stamped>,
    receiver: Receiver<Stamped>,
    epoch: Arc<AtomicU64>,
}

impl Default for SpawnQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Append a request at the back
    pub fn enqueue(&self, request: SpawnRequest) {
        let epoch = self.epoch.load(Ordering::Acquire);
        // The queue owns a receiver, so sending cannot fail
        let _ = self.sender.send(Stamped { epoch, request });
    }

    /// Remove up to `max` requests from the front, in order
    pub fn drain(&self, max: usize) -> Vec<SpawnRequest> {
        let current = self.epoch.load(Ordering::Acquire);
        let mut batch = Vec::with_capacity(max.min(self.receiver.len()));
        while batch.len() < max {
            match self.receiver.try_recv() {
                Ok(stamped) if stamped.epoch == current => batch.push(stamped.request),
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Drop every pending request and invalidate session producers.
    /// Returns the number of requests discarded.
    pub fn clear(&self) -> usize {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.receiver.try_iter().count()
    }

    /// A producer that follows the queue across clears (e.g. a remote feed)
    pub fn producer(&self) -> SpawnProducer {
        SpawnProducer {
            sender: self.sender.clone(),
            epoch: Arc::clone(&self.epoch),
            session: None,
        }
    }

    /// A producer that stops accepting requests after the next `clear()`
    pub fn session_producer(&self) -> SpawnProducer {
        SpawnProducer {
            sender: self.sender.clone(),
            epoch: Arc::clone(&self.epoch),
            session: Some(self.epoch.load(Ordering::Acquire)),
        }
    }
}

/// Cloneable, thread-safe handle for pushing spawn requests
#[derive(Clone)]
pub struct SpawnProducer {
    sender: Sender<Stamped>,
    epoch: Arc<AtomicU64>,
    session: Option<u64>,
}

impl SpawnProducer {
    /// Enqueue one request. Returns false if the request was refused because
    /// this producer's session was cleared or the simulation is gone.
    pub fn enqueue(&self, kind: impl Into<String>, presettled: bool) -> bool {
        self.push(SpawnRequest {
            kind: kind.into(),
            presettled,
        })
    }

    pub fn push(&self, request: SpawnRequest) -> bool {
        let current = self.epoch.load(Ordering::Acquire);
        let epoch = match self.session {
            Some(session) if session != current => return false,
            Some(session) => session,
            None => current,
        };
        self.sender.send(Stamped { epoch, request }).is_ok()
    }

    /// Whether requests from this producer can still reach the queue
    pub fn is_active(&self) -> bool {
        match self.session {
            Some(session) => session == self.epoch.load(Ordering::Acquire),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_is_bounded_and_ordered() {
        let queue = SpawnQueue::new();
        for i in 0..7 {
            queue.enqueue(SpawnRequest::live(format!("k{i}")));
        }
        let first = queue.drain(5);
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].kind, "k0");
        assert_eq!(first[4].kind, "k4");

        let rest = queue.drain(5);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].kind, "k6");
        assert!(queue.is_empty());
        assert!(queue.drain(5).is_empty());
    }

    #[test]
    fn clear_discards_pending() {
        let queue = SpawnQueue::new();
        queue.enqueue(SpawnRequest::live("a"));
        queue.enqueue(SpawnRequest::historical("b"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());

        queue.enqueue(SpawnRequest::live("c"));
        assert_eq!(queue.drain(10), vec![SpawnRequest::live("c")]);
    }

    #[test]
    fn session_producer_is_cut_off_by_clear() {
        let queue = SpawnQueue::new();
        let session = queue.session_producer();
        let feed = queue.producer();

        assert!(session.enqueue("a", false));
        queue.clear();

        assert!(!session.is_active());
        assert!(!session.enqueue("b", false));
        assert!(feed.is_active());
        assert!(feed.enqueue("c", true));

        assert_eq!(queue.drain(10), vec![SpawnRequest::historical("c")]);
    }

    #[test]
    fn producers_work_across_threads() {
        let queue = SpawnQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let producer = queue.producer();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        assert!(producer.enqueue(format!("{t}-{i}"), false));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(queue.len(), 100);
        let mut drained = 0;
        while !queue.is_empty() {
            drained += queue.drain(30).len();
        }
        assert_eq!(drained, 100);
    }
}
