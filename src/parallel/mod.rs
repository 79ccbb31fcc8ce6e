//! Concurrency substrate shared by every pattern.
//!
//! # Architecture Responsibilities
//!
//! This module owns **resources** and **execution strategy**, never pattern logic:
//!
//! - [`ExecutionContext`]: concurrency degree, ordering flag, queue policy, and
//!   ownership of one [`WorkerPool`] plus one [`ThreadRegistry`]
//! - [`ThreadBudget`]: the decrement-only spawn allowance of one
//!   divide-and-conquer invocation
//! - [`Spawner`] back ends: [`Inline`], [`NativeThreads`], [`TaskGroupPool`] and
//!   the runtime-selected [`Backend`]
//! - [`Queue`]: bounded MPMC queue honouring the context's queue policy
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   Patterns      │    │   Parallel       │    │   Host          │
//! │                 │───▶│   Module         │───▶│   Threads       │
//! │ • divide/merge  │    │ • budget         │    │                 │
//! │ • map           │    │ • spawners       │    │ • OS threads    │
//! │ • ordering      │    │ • pool/registry  │    │ • rayon pool    │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use parapat::parallel::{BackendKind, ExecutionContext};
//!
//! let mut ctx = ExecutionContext::with_threads(2).unwrap();
//! ctx.set_backend(BackendKind::TaskGroup);
//! assert_eq!(ctx.concurrency_degree(), 2);
//! assert!(ctx.is_ordered());
//! ```

pub mod backend;
pub mod budget;
pub mod context;
pub mod pool;
pub mod queue;
pub mod registry;

pub use backend::{Backend, BackendKind, Inline, NativeThreads, Spawner, Task, TaskGroup, TaskGroupPool};
pub use budget::ThreadBudget;
pub use context::{ExecutionContext, DEFAULT_CONCURRENCY_DEGREE, DEFAULT_QUEUE_SIZE};
pub use pool::WorkerPool;
pub use queue::{Queue, QueueMode};
pub use registry::ThreadRegistry;
