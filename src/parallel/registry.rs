use parking_lot::Mutex;
use std::thread::{self, ThreadId};

use crate::errors::{PatternError, PatternResult};

/// Maps live worker threads to small positional ids.
///
/// A thread's id is its position in registration order. Ids are only stable
/// while no thread registered earlier deregisters: removing an entry shifts
/// every later id down by one. Workers that need per-worker storage should
/// look their id up while the set of registered threads is fixed (for example
/// between pool start-up and shutdown).
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    table: Mutex<Vec<ThreadId>>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the calling thread. Registering twice is a no-op.
    pub fn register_thread(&self) {
        let current = thread::current().id();
        let mut table = self.table.lock();
        if !table.contains(&current) {
            table.push(current);
        }
    }

    /// Remove the calling thread, if present.
    pub fn deregister_thread(&self) {
        let current = thread::current().id();
        self.table.lock().retain(|id| *id != current);
    }

    /// Current positional id of the calling thread.
    pub fn get_thread_id(&self) -> PatternResult<usize> {
        let current = thread::current().id();
        self.table
            .lock()
            .iter()
            .position(|id| *id == current)
            .ok_or(PatternError::ThreadNotRegistered)
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}
