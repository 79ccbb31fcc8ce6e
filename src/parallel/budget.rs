use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared, decrement-only count of concurrent branches a call tree may still
/// spawn.
///
/// One budget is created per top-level divide-and-conquer invocation and shared
/// by reference across the whole recursion. It is never replenished.
#[derive(Debug)]
pub struct ThreadBudget {
    remaining: AtomicUsize,
}

impl ThreadBudget {
    pub fn new(initial: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(initial),
        }
    }

    /// Take one unit of budget. Fails closed: returns `false` without touching
    /// the counter once it has reached zero.
    pub fn try_acquire(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
