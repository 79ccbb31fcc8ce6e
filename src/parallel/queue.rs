use crossbeam::channel::{Receiver, Sender, bounded};
use crossbeam::queue::ArrayQueue;
use crossbeam::utils::Backoff;
use serde::{Deserialize, Serialize};

use crate::errors::{PatternError, PatternResult};

/// How bounded queues handed out by an execution context synchronise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    /// Producers and consumers park on a channel when it is full or empty.
    #[default]
    Blocking,
    /// Producers and consumers spin with backoff on a lock-free ring buffer.
    LockFree,
}

/// Bounded multi-producer multi-consumer queue.
pub enum Queue<T> {
    Blocking { tx: Sender<T>, rx: Receiver<T> },
    LockFree(ArrayQueue<T>),
}

impl<T> Queue<T> {
    /// `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize, mode: QueueMode) -> Self {
        let capacity = capacity.max(1);
        match mode {
            QueueMode::Blocking => {
                let (tx, rx) = bounded(capacity);
                Queue::Blocking { tx, rx }
            }
            QueueMode::LockFree => Queue::LockFree(ArrayQueue::new(capacity)),
        }
    }

    pub fn mode(&self) -> QueueMode {
        match self {
            Queue::Blocking { .. } => QueueMode::Blocking,
            Queue::LockFree(_) => QueueMode::LockFree,
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            Queue::Blocking { tx, .. } => tx.capacity().unwrap_or(usize::MAX),
            Queue::LockFree(queue) => queue.capacity(),
        }
    }

    /// Push an item, waiting while the queue is full.
    pub fn push(&self, item: T) -> PatternResult<()> {
        match self {
            Queue::Blocking { tx, .. } => tx.send(item).map_err(|_| PatternError::PoolClosed),
            Queue::LockFree(queue) => {
                let backoff = Backoff::new();
                let mut item = item;
                loop {
                    match queue.push(item) {
                        Ok(()) => return Ok(()),
                        Err(rejected) => {
                            item = rejected;
                            backoff.snooze();
                        }
                    }
                }
            }
        }
    }

    /// Pop an item, waiting while the queue is empty.
    pub fn pop(&self) -> PatternResult<T> {
        match self {
            Queue::Blocking { rx, .. } => rx.recv().map_err(|_| PatternError::PoolClosed),
            Queue::LockFree(queue) => {
                let backoff = Backoff::new();
                loop {
                    if let Some(item) = queue.pop() {
                        return Ok(item);
                    }
                    backoff.snooze();
                }
            }
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        match self {
            Queue::Blocking { rx, .. } => rx.try_recv().ok(),
            Queue::LockFree(queue) => queue.pop(),
        }
    }
}
