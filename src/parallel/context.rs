use parking_lot::Mutex;
use std::sync::Arc;

use super::backend::{Backend, BackendKind, Inline, NativeThreads, TaskGroupPool};
use super::pool::WorkerPool;
use super::queue::{Queue, QueueMode};
use super::registry::ThreadRegistry;
use crate::config::ExecutionConfig;
use crate::errors::{PatternError, PatternResult};

pub const DEFAULT_CONCURRENCY_DEGREE: usize = 4;
pub const DEFAULT_QUEUE_SIZE: usize = 100;

/// Native execution context: parallelism settings plus the worker pool and
/// thread registry that patterns run against.
///
/// The pool is sized once at construction. Changing the concurrency degree
/// afterwards only affects patterns started later; it never resizes the pool.
pub struct ExecutionContext {
    concurrency_degree: usize,
    ordering: bool,
    queue_size: usize,
    queue_mode: QueueMode,
    backend: BackendKind,
    registry: Arc<ThreadRegistry>,
    pool: WorkerPool,
    task_groups: Mutex<Option<TaskGroupPool>>,
}

impl ExecutionContext {
    /// Four workers, ordered execution.
    pub fn new() -> PatternResult<Self> {
        Self::with_threads(DEFAULT_CONCURRENCY_DEGREE)
    }

    pub fn with_threads(threads: usize) -> PatternResult<Self> {
        Self::with_threads_ordered(threads, true)
    }

    pub fn with_threads_ordered(threads: usize, ordered: bool) -> PatternResult<Self> {
        let registry = Arc::new(ThreadRegistry::new());
        let pool = WorkerPool::initialise(threads, registry.clone())?;
        Ok(Self {
            concurrency_degree: threads,
            ordering: ordered,
            queue_size: DEFAULT_QUEUE_SIZE,
            queue_mode: QueueMode::default(),
            backend: BackendKind::default(),
            registry,
            pool,
            task_groups: Mutex::new(None),
        })
    }

    /// Size the context from the machine: `thread_percentage` of the available
    /// cores, capped by `max_threads` when it is non-zero, never below one.
    pub fn from_available_cores(max_threads: usize, thread_percentage: u8) -> PatternResult<Self> {
        Self::with_threads(available_workers(max_threads, thread_percentage))
    }

    pub fn from_config(config: &ExecutionConfig) -> PatternResult<Self> {
        if config.queue_size == 0 {
            return Err(PatternError::InvalidConfig(
                "queue_size must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&config.thread_percentage) {
            return Err(PatternError::InvalidConfig(format!(
                "thread_percentage must be within 1..=100, got {}",
                config.thread_percentage
            )));
        }

        let threads = if config.auto_degree {
            available_workers(config.max_threads, config.thread_percentage)
        } else {
            config.concurrency_degree
        };

        let mut ctx = Self::with_threads_ordered(threads, config.ordering)?;
        ctx.set_queue_size(config.queue_size);
        ctx.set_queue_mode(config.queue_mode);
        ctx.set_backend(config.backend);
        Ok(ctx)
    }

    pub fn set_concurrency_degree(&mut self, degree: usize) {
        self.concurrency_degree = degree;
    }

    pub fn concurrency_degree(&self) -> usize {
        self.concurrency_degree
    }

    pub fn enable_ordering(&mut self) {
        self.ordering = true;
    }

    pub fn disable_ordering(&mut self) {
        self.ordering = false;
    }

    pub fn is_ordered(&self) -> bool {
        self.ordering
    }

    pub fn set_queue_size(&mut self, size: usize) {
        self.queue_size = size;
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub fn set_queue_mode(&mut self, mode: QueueMode) {
        self.queue_mode = mode;
    }

    pub fn queue_mode(&self) -> QueueMode {
        self.queue_mode
    }

    pub fn set_backend(&mut self, backend: BackendKind) {
        self.backend = backend;
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Spawner for the configured back end.
    ///
    /// Task groups run on a dedicated rayon pool of `concurrency_degree + 1`
    /// threads: one for the inline branch plus one per spawn the budget allows.
    /// The pool is reused until the degree changes.
    pub fn spawner(&self) -> PatternResult<Backend> {
        Ok(match self.backend {
            BackendKind::Sequential => Backend::Sequential(Inline),
            BackendKind::Native => Backend::Native(NativeThreads),
            BackendKind::TaskGroup => Backend::TaskGroup(self.task_group_pool()?),
        })
    }

    fn task_group_pool(&self) -> PatternResult<TaskGroupPool> {
        let threads = self.concurrency_degree.saturating_add(1);
        let mut cached = self.task_groups.lock();
        if let Some(pool) = cached.as_ref().filter(|pool| pool.threads() == threads) {
            return Ok(pool.clone());
        }
        let pool = TaskGroupPool::with_threads(threads)?;
        tracing::debug!(threads, "task group pool started");
        *cached = Some(pool.clone());
        Ok(pool)
    }

    /// A bounded queue following this context's size and mode.
    pub fn make_queue<T>(&self) -> Queue<T> {
        Queue::new(self.queue_size, self.queue_mode)
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn registry(&self) -> &Arc<ThreadRegistry> {
        &self.registry
    }

    pub fn register_thread(&self) {
        self.registry.register_thread();
    }

    pub fn deregister_thread(&self) {
        self.registry.deregister_thread();
    }

    pub fn get_thread_id(&self) -> PatternResult<usize> {
        self.registry.get_thread_id()
    }
}

/// Workers to use given a thread cap (0 = no cap) and a percentage of the
/// available cores.
pub fn available_workers(max_threads: usize, thread_percentage: u8) -> usize {
    let available_cores = num_cpus::get();
    let by_percentage = std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

    if max_threads > 0 {
        std::cmp::min(max_threads, by_percentage)
    } else {
        by_percentage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_construction() {
        let ctx = ExecutionContext::new().unwrap();
        assert_eq!(ctx.concurrency_degree(), 4);
        assert!(ctx.is_ordered());
        assert_eq!(ctx.queue_size(), 100);
        assert_eq!(ctx.queue_mode(), QueueMode::Blocking);
        assert_eq!(ctx.pool().size(), 4);
    }

    #[test]
    fn test_explicit_threads_and_ordering() {
        let ctx = ExecutionContext::with_threads_ordered(2, false).unwrap();
        assert_eq!(ctx.concurrency_degree(), 2);
        assert!(!ctx.is_ordered());
        assert_eq!(ctx.pool().size(), 2);
    }

    #[test]
    fn test_degree_change_does_not_resize_pool() {
        let mut ctx = ExecutionContext::with_threads(3).unwrap();
        ctx.set_concurrency_degree(16);
        assert_eq!(ctx.concurrency_degree(), 16);
        assert_eq!(ctx.pool().size(), 3);

        ctx.disable_ordering();
        assert!(!ctx.is_ordered());
        ctx.enable_ordering();
        assert!(ctx.is_ordered());
    }

    #[test]
    fn test_queue_follows_context_policy() {
        let mut ctx = ExecutionContext::with_threads(1).unwrap();
        ctx.set_queue_size(7);
        ctx.set_queue_mode(QueueMode::LockFree);
        let queue: Queue<u32> = ctx.make_queue();
        assert_eq!(queue.capacity(), 7);
        assert_eq!(queue.mode(), QueueMode::LockFree);
    }

    #[test]
    fn test_registry_forwarding() {
        let ctx = ExecutionContext::with_threads(0).unwrap();
        assert!(matches!(ctx.get_thread_id(), Err(PatternError::ThreadNotRegistered)));
        ctx.register_thread();
        assert_eq!(ctx.get_thread_id().unwrap(), 0);
        ctx.deregister_thread();
        assert!(ctx.get_thread_id().is_err());
    }

    #[test]
    fn test_from_config_validates() {
        let config = ExecutionConfig {
            queue_size: 0,
            ..ExecutionConfig::default()
        };
        assert!(matches!(
            ExecutionContext::from_config(&config),
            Err(PatternError::InvalidConfig(_))
        ));

        let config = ExecutionConfig {
            thread_percentage: 150,
            ..ExecutionConfig::default()
        };
        assert!(ExecutionContext::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = ExecutionConfig {
            concurrency_degree: 2,
            ordering: false,
            queue_size: 8,
            queue_mode: QueueMode::LockFree,
            backend: BackendKind::TaskGroup,
            ..ExecutionConfig::default()
        };
        let ctx = ExecutionContext::from_config(&config).unwrap();
        assert_eq!(ctx.concurrency_degree(), 2);
        assert!(!ctx.is_ordered());
        assert_eq!(ctx.queue_size(), 8);
        assert_eq!(ctx.queue_mode(), QueueMode::LockFree);
        assert_eq!(ctx.backend(), BackendKind::TaskGroup);
    }

    #[test]
    fn test_task_group_spawner_is_sized_from_degree() {
        let mut ctx = ExecutionContext::with_threads(3).unwrap();
        ctx.set_backend(BackendKind::TaskGroup);

        let Backend::TaskGroup(group) = ctx.spawner().unwrap() else {
            panic!("expected a task group back end");
        };
        assert_eq!(group.threads(), 4);

        ctx.set_concurrency_degree(6);
        let Backend::TaskGroup(group) = ctx.spawner().unwrap() else {
            panic!("expected a task group back end");
        };
        assert_eq!(group.threads(), 7);
    }

    #[test]
    fn test_spawner_follows_backend_kind() {
        let mut ctx = ExecutionContext::with_threads(2).unwrap();
        for kind in [BackendKind::Sequential, BackendKind::Native, BackendKind::TaskGroup] {
            ctx.set_backend(kind);
            assert_eq!(ctx.spawner().unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_from_available_cores() {
        let ctx = ExecutionContext::from_available_cores(2, 100).unwrap();
        assert!((1..=2).contains(&ctx.concurrency_degree()));
        assert_eq!(ctx.pool().size(), ctx.concurrency_degree());
    }

    #[test]
    fn test_available_workers_respects_cap() {
        assert!(available_workers(0, 75) >= 1);
        assert!(available_workers(2, 100) <= 2);
        assert!(available_workers(1, 1) == 1);
    }
}
