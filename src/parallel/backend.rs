//! Concurrency back ends behind one submit-and-join capability.
//!
//! A [`Spawner`] opens a task group, hands the body a [`TaskGroup`] to submit
//! work through, and returns only once every submitted task has finished.
//! Tasks may borrow from the caller's stack for the lifetime of the group.

use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::errors::{PatternError, PatternResult};

/// A unit of work submitted to a task group.
pub type Task<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// Submission side of an open task group.
pub trait TaskGroup<'scope> {
    /// Start `task` concurrently with the caller (or inline, for sequential
    /// back ends).
    fn submit(&self, task: Task<'scope>) -> PatternResult<()>;
}

/// A back end able to run a group of borrowed tasks and join them.
pub trait Spawner: Sync {
    /// Run `body` with a task group; every task submitted through it has
    /// completed when this returns.
    fn scope<'scope, B, R>(&self, body: B) -> PatternResult<R>
    where
        B: FnOnce(&dyn TaskGroup<'scope>) -> R + Send,
        R: Send;
}

/// Back end selector used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Sequential,
    #[default]
    Native,
    TaskGroup,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Sequential => "sequential",
            BackendKind::Native => "native",
            BackendKind::TaskGroup => "task_group",
        };
        f.write_str(name)
    }
}

/// Runs every task at submission time on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

struct InlineGroup;

impl<'scope> TaskGroup<'scope> for InlineGroup {
    fn submit(&self, task: Task<'scope>) -> PatternResult<()> {
        task();
        Ok(())
    }
}

impl Spawner for Inline {
    fn scope<'scope, B, R>(&self, body: B) -> PatternResult<R>
    where
        B: FnOnce(&dyn TaskGroup<'scope>) -> R + Send,
        R: Send,
    {
        Ok(body(&InlineGroup))
    }
}

/// One scoped OS thread per submitted task.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeThreads;

struct NativeGroup<'a, 'scope> {
    scope: &'a crossbeam::thread::Scope<'scope>,
}

impl<'scope> TaskGroup<'scope> for NativeGroup<'_, 'scope> {
    fn submit(&self, task: Task<'scope>) -> PatternResult<()> {
        self.scope
            .builder()
            .name("parapat-task".to_string())
            .spawn(move |_| task())
            .map(|_| ())
            .map_err(PatternError::SpawnFailed)
    }
}

impl Spawner for NativeThreads {
    fn scope<'scope, B, R>(&self, body: B) -> PatternResult<R>
    where
        B: FnOnce(&dyn TaskGroup<'scope>) -> R + Send,
        R: Send,
    {
        crossbeam::thread::scope(|s| body(&NativeGroup { scope: s })).map_err(scoped_panic)
    }
}

/// crossbeam reports child panics as a boxed `Vec` of payloads.
fn scoped_panic(payload: Box<dyn Any + Send>) -> PatternError {
    match payload.downcast::<Vec<Box<dyn Any + Send>>>() {
        Ok(mut panics) if !panics.is_empty() => PatternError::from_panic(panics.swap_remove(0)),
        Ok(_) => PatternError::TaskPanicked("scoped thread panicked".to_string()),
        Err(payload) => PatternError::from_panic(payload),
    }
}

/// Work-stealing task groups on a rayon pool.
///
/// Without a dedicated pool, groups run on rayon's global pool.
#[derive(Clone, Default)]
pub struct TaskGroupPool {
    pool: Option<Arc<ThreadPool>>,
}

impl TaskGroupPool {
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Build a dedicated pool with `threads` workers (at least one).
    pub fn with_threads(threads: usize) -> PatternResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("parapat-group-{i}"))
            .build()
            .map_err(|e| PatternError::SpawnFailed(io::Error::other(e.to_string())))?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl fmt::Debug for TaskGroupPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGroupPool")
            .field("dedicated", &self.pool.is_some())
            .field("threads", &self.threads())
            .finish()
    }
}

struct RayonGroup<'a, 'scope> {
    scope: &'a rayon::Scope<'scope>,
}

impl<'scope> TaskGroup<'scope> for RayonGroup<'_, 'scope> {
    fn submit(&self, task: Task<'scope>) -> PatternResult<()> {
        self.scope.spawn(move |_| task());
        Ok(())
    }
}

impl Spawner for TaskGroupPool {
    fn scope<'scope, B, R>(&self, body: B) -> PatternResult<R>
    where
        B: FnOnce(&dyn TaskGroup<'scope>) -> R + Send,
        R: Send,
    {
        let op = |s: &rayon::Scope<'scope>| body(&RayonGroup { scope: s });
        Ok(match &self.pool {
            Some(pool) => pool.scope(op),
            None => rayon::scope(op),
        })
    }
}

/// Runtime-selected back end.
#[derive(Debug, Clone)]
pub enum Backend {
    Sequential(Inline),
    Native(NativeThreads),
    TaskGroup(TaskGroupPool),
}

impl Backend {
    pub fn from_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Sequential => Backend::Sequential(Inline),
            BackendKind::Native => Backend::Native(NativeThreads),
            BackendKind::TaskGroup => Backend::TaskGroup(TaskGroupPool::global()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Sequential(_) => BackendKind::Sequential,
            Backend::Native(_) => BackendKind::Native,
            Backend::TaskGroup(_) => BackendKind::TaskGroup,
        }
    }
}

impl Spawner for Backend {
    fn scope<'scope, B, R>(&self, body: B) -> PatternResult<R>
    where
        B: FnOnce(&dyn TaskGroup<'scope>) -> R + Send,
        R: Send,
    {
        match self {
            Backend::Sequential(inline) => inline.scope(body),
            Backend::Native(native) => native.scope(body),
            Backend::TaskGroup(group) => group.scope(body),
        }
    }
}
